//! Bounded file reads and YAML parsing into `serde_json::Value` trees.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::ContentError;

/// Default maximum size of a single source file (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10_485_760;

/// Read a file using a bounded streaming read, enforcing `max_file_size`.
///
/// Reads at most `max_file_size + 1` bytes so oversized files are detected
/// without loading them whole.
///
/// # Errors
///
/// Returns a [`ContentError`] if the file cannot be opened or read, exceeds
/// `max_file_size`, or is not valid UTF-8.
pub fn read_file_bounded(path: &Path, max_file_size: u64) -> Result<String, ContentError> {
    let file = std::fs::File::open(path).map_err(|source| ContentError::Io {
        path: path.to_owned(),
        source,
    })?;

    let mut buffer = Vec::new();
    file.take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(|source| ContentError::Io {
            path: path.to_owned(),
            source,
        })?;

    if buffer.len() as u64 > max_file_size {
        return Err(ContentError::TooLarge {
            path: path.to_owned(),
            limit: max_file_size,
        });
    }

    String::from_utf8(buffer).map_err(|_| ContentError::InvalidEncoding {
        path: path.to_owned(),
    })
}

/// Parse YAML text into a JSON value tree. Blank input is `Value::Null`.
///
/// # Errors
///
/// Returns [`ContentError::Yaml`] if the text is not valid YAML.
pub fn parse_yaml(content: &str, path: &Path) -> Result<Value, ContentError> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_saphyr::from_str::<Value>(content).map_err(|e| ContentError::Yaml {
        path: path.to_owned(),
        message: e.to_string(),
    })
}

/// Read and parse a YAML file.
///
/// # Errors
///
/// Returns a [`ContentError`] if the file cannot be read or parsed.
pub fn read_yaml_file(path: &Path, max_file_size: u64) -> Result<Value, ContentError> {
    let content = read_file_bounded(path, max_file_size)?;
    parse_yaml(&content, path)
}
