//! Content loader.
//!
//! Scans `{programs,landings,locations,pages}/{slug}/{files}` under the
//! content root and parses every content file into a [`ContentFile`].
//! A file that cannot be read or parsed is logged and skipped; the scan
//! itself never fails.

use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::de::DeserializeOwned;
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::{ContentError, SkippedFile};
use crate::filename::{is_content_file_name, parse_file_name};
use crate::model::{ContentFile, ContentMeta, ContentType, SchemaConfig};
use crate::yaml::{DEFAULT_MAX_FILE_SIZE, read_yaml_file};

/// Loader options.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LoaderConfig {
    /// Directory holding the four content collections.
    pub content_dir: PathBuf,
    /// Exclude patterns (glob format), matched against the full path and the file name.
    pub exclude: Vec<String>,
    /// Maximum size of a single content file in bytes (default: 10 MB).
    pub max_file_size: u64,
}

impl LoaderConfig {
    #[must_use]
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            exclude: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Everything one scan produced.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub files: Vec<ContentFile>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone)]
pub struct ContentLoader {
    config: LoaderConfig,
    exclude: Vec<Pattern>,
}

impl ContentLoader {
    /// Build a loader. Invalid exclude patterns are logged and ignored.
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        let exclude = config
            .exclude
            .iter()
            .filter_map(|pat| match Pattern::new(pat) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(pattern = %pat, error = %e, "ignoring invalid exclude pattern");
                    None
                }
            })
            .collect();
        Self { config, exclude }
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load every content file across all four collections.
    #[must_use]
    pub fn load_all_content(&self) -> Vec<ContentFile> {
        self.load_all().files
    }

    /// Load every content file, also reporting the files that were skipped.
    #[must_use]
    pub fn load_all(&self) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();
        if !self.config.content_dir.is_dir() {
            tracing::warn!(
                path = %self.config.content_dir.display(),
                "content directory not found; no content loaded"
            );
            return outcome;
        }
        for content_type in ContentType::ALL {
            self.load_type_into(content_type, &mut outcome);
        }
        tracing::debug!(
            loaded = outcome.files.len(),
            skipped = outcome.skipped.len(),
            "content scan complete"
        );
        outcome
    }

    /// Load the files of a single collection.
    #[must_use]
    pub fn load_type(&self, content_type: ContentType) -> LoadOutcome {
        let mut outcome = LoadOutcome::default();
        self.load_type_into(content_type, &mut outcome);
        outcome
    }

    fn load_type_into(&self, content_type: ContentType, outcome: &mut LoadOutcome) {
        let type_dir = self.content_root().join(content_type.dir_name());
        if !type_dir.is_dir() {
            tracing::debug!(path = %type_dir.display(), "collection directory absent");
            return;
        }

        for entry_result in WalkDir::new(&type_dir)
            .min_depth(2)
            .max_depth(2)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "directory traversal error");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_content_file_name(name) || self.is_excluded(path) {
                continue;
            }
            let Some(slug) = path
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
            else {
                continue;
            };

            match parse_content_file(path, slug, content_type, self.config.max_file_size) {
                Ok(file) => outcome.files.push(file),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unparseable content file");
                    outcome.skipped.push(SkippedFile::from(&e));
                }
            }
        }
    }

    /// Absolute content root, so every `file_path` is absolute.
    fn content_root(&self) -> PathBuf {
        self.config
            .content_dir
            .canonicalize()
            .unwrap_or_else(|_| self.config.content_dir.clone())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|pattern| {
            pattern.matches(&path_str)
                || path
                    .file_name()
                    .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
        })
    }
}

fn parse_block<T: DeserializeOwned>(
    data: &Value,
    block: &'static str,
    path: &Path,
) -> Result<Option<T>, ContentError> {
    match data.get(block) {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|source| ContentError::InvalidBlock {
                path: path.to_owned(),
                block,
                source,
            }),
        Some(_) => {
            tracing::warn!(path = %path.display(), block, "block is not a mapping, ignoring it");
            Ok(None)
        }
    }
}

/// Parse one content file belonging to the unit `slug` of `content_type`.
///
/// # Errors
///
/// Returns a [`ContentError`] if the file cannot be read or is not a YAML
/// mapping. Mistyped fields inside `meta`/`schema` never fail the parse.
pub fn parse_content_file(
    path: &Path,
    slug: &str,
    content_type: ContentType,
    max_file_size: u64,
) -> Result<ContentFile, ContentError> {
    let data = read_yaml_file(path, max_file_size)?;
    if !data.is_object() {
        return Err(ContentError::NotAMapping {
            path: path.to_owned(),
        });
    }

    let meta: Option<ContentMeta> = parse_block(&data, "meta", path)?;
    let schema: Option<SchemaConfig> = parse_block(&data, "schema", path)?;

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let parts = parse_file_name(name);

    let title = data
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| meta.as_ref().and_then(|m| m.page_title.as_deref()))
        .unwrap_or(slug)
        .to_owned();

    Ok(ContentFile {
        slug: slug.to_owned(),
        title,
        content_type,
        locale: parts.locale,
        file_path: path.to_path_buf(),
        variant: parts.variant,
        version: parts.version,
        meta,
        schema,
        data,
    })
}
