//! Error types for content loading.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// A file-level failure that prevented a content file from being loaded.
///
/// These never abort a scan: the loader logs them and records the file in
/// [`SkippedFile`] so callers can decide whether to surface them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    /// An I/O error occurred while reading the file.
    #[error("{}: failed to read file: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exceeded the configured maximum size limit.
    #[error("{}: file exceeds maximum size of {limit} bytes", .path.display())]
    TooLarge { path: PathBuf, limit: u64 },

    /// The file content is not valid UTF-8.
    #[error("{}: file is not valid UTF-8", .path.display())]
    InvalidEncoding { path: PathBuf },

    /// The file content could not be parsed as YAML.
    #[error("{}: YAML parse error: {message}", .path.display())]
    Yaml { path: PathBuf, message: String },

    /// The document parsed but its top level is not a mapping.
    #[error("{}: top-level document must be a mapping", .path.display())]
    NotAMapping { path: PathBuf },

    /// A known block (`meta`, `schema`) has fields of the wrong type.
    #[error("{}: invalid `{block}` block: {source}", .path.display())]
    InvalidBlock {
        path: PathBuf,
        block: &'static str,
        source: serde_json::Error,
    },
}

impl ContentError {
    /// The file this error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::TooLarge { path, .. }
            | Self::InvalidEncoding { path }
            | Self::Yaml { path, .. }
            | Self::NotAMapping { path }
            | Self::InvalidBlock { path, .. } => path,
        }
    }
}

/// A content file the loader had to leave out of its output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFile {
    pub file_path: PathBuf,
    pub reason: String,
}

impl From<&ContentError> for SkippedFile {
    fn from(err: &ContentError) -> Self {
        Self {
            file_path: err.path().to_path_buf(),
            reason: err.to_string(),
        }
    }
}
