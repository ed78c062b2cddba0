//! Configuration for a validation run.
//!
//! All source locations are relative to the site root unless absolute.
//! Defaults follow the conventional site layout; an optional YAML file
//! (`site-validator.yml` at the root, or `--config`) overrides any field.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use site_content::LoaderConfig;
use site_content::yaml::{DEFAULT_MAX_FILE_SIZE, read_file_bounded};

/// Config file picked up from the site root when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "site-validator.yml";

/// Locations of every source the validators read.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct SiteConfig {
    /// Site root; relative paths below resolve against it.
    #[serde(skip)]
    pub root: PathBuf,
    /// Content tree: `{programs,landings,locations,pages}/{slug}/{files}`.
    pub content_dir: PathBuf,
    /// Structured-data definition document.
    pub schema_definitions: PathBuf,
    /// Component registry: `{component}/{version}/{schema file, examples/}`.
    pub component_registry: PathBuf,
    /// Theme file holding the `backgrounds` palette.
    pub theme: PathBuf,
    /// Image registry keyed by image id.
    pub image_registry: PathBuf,
    /// Directory with one FAQ source per locale (`en.yml`, `es.yml`).
    pub faq_dir: PathBuf,
    /// Public asset directory that local image `src` paths resolve against.
    pub public_dir: PathBuf,
    /// Exclude patterns (glob format) for content files.
    pub exclude: Vec<String>,
    /// Maximum size of any single source file in bytes (default: 10 MB).
    pub max_file_size: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            content_dir: PathBuf::from("src/content"),
            schema_definitions: PathBuf::from("src/content/schema-org.yml"),
            component_registry: PathBuf::from("src/components/registry"),
            theme: PathBuf::from("src/content/theme.yml"),
            image_registry: PathBuf::from("src/content/images.yml"),
            faq_dir: PathBuf::from("src/content/faqs"),
            public_dir: PathBuf::from("public"),
            exclude: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl SiteConfig {
    /// Conventional layout under `root`.
    #[must_use]
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load configuration for `root`.
    ///
    /// An explicit `config_file` must exist. Without one, `site-validator.yml`
    /// under the root is used when present, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit config file is missing, or if a config
    /// file cannot be read or parsed.
    pub fn load(root: &Path, config_file: Option<&Path>) -> anyhow::Result<Self> {
        let path = match config_file {
            Some(explicit) => {
                if !explicit.is_file() {
                    anyhow::bail!("Config file does not exist: {}", explicit.display());
                }
                explicit.to_path_buf()
            }
            None => {
                let default = root.join(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    tracing::debug!(root = %root.display(), "no config file, using defaults");
                    return Ok(Self::from_root(root));
                }
                default
            }
        };

        let text = read_file_bounded(&path, DEFAULT_MAX_FILE_SIZE)?;
        let mut config = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_saphyr::from_str::<Self>(&text)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        };
        config.root = root.to_path_buf();
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Resolve a configured path against the root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Loader options derived from this config.
    #[must_use]
    pub fn loader_config(&self) -> LoaderConfig {
        let mut loader = LoaderConfig::new(self.resolve(&self.content_dir));
        loader.exclude.clone_from(&self.exclude);
        loader.max_file_size = self.max_file_size;
        loader
    }
}
