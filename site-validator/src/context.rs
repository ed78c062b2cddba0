//! The shared, read-only input of every validator.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use site_content::{
    ContentFile, ContentLoader, SkippedFile, available_schema_keys, build_valid_url_set,
    load_schema_definitions,
};

use crate::config::SiteConfig;
use crate::validators::redirects::analyze_redirects;

/// One accepted redirect: `source` (normalized) resolves to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectEntry {
    pub source: String,
    pub target: String,
    /// Content file that declared the redirect.
    pub file: PathBuf,
}

/// Normalized redirect source to its entry.
pub type RedirectMap = BTreeMap<String, RedirectEntry>;

/// An explicit sitemap entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub loc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_frequency: Option<String>,
}

/// Everything validators read. Built once per run and never mutated by them.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub content_files: Vec<ContentFile>,
    pub redirect_map: RedirectMap,
    pub valid_urls: BTreeSet<String>,
    pub available_schemas: BTreeSet<String>,
    /// Raw structured-data definition document (`Null` when unavailable).
    pub schema_definitions: Value,
    /// Reserved for an explicit sitemap source; the builder leaves it empty.
    pub sitemap_entries: Vec<SitemapEntry>,
    /// Content files the loader could not parse.
    pub skipped_files: Vec<SkippedFile>,
}

impl ValidationContext {
    /// Derive the URL set and redirect map from already-loaded files.
    #[must_use]
    pub fn from_files(content_files: Vec<ContentFile>) -> Self {
        let valid_urls = build_valid_url_set(&content_files);
        let redirect_map = analyze_redirects(&content_files, &valid_urls).redirect_map;
        Self {
            content_files,
            redirect_map,
            valid_urls,
            ..Self::default()
        }
    }

    /// Attach a structured-data definition document and its key set.
    #[must_use]
    pub fn with_schema_definitions(mut self, definitions: Value) -> Self {
        self.available_schemas = available_schema_keys(&definitions);
        self.schema_definitions = definitions;
        self
    }

    /// Base (non-variant) files only.
    pub fn base_files(&self) -> impl Iterator<Item = &ContentFile> {
        self.content_files.iter().filter(|f| f.is_base())
    }
}

/// Builds a fresh [`ValidationContext`] from disk.
#[derive(Debug)]
pub struct ContextBuilder<'a> {
    config: &'a SiteConfig,
}

impl<'a> ContextBuilder<'a> {
    #[must_use]
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Scan content, load schema definitions and compute the derived indexes.
    ///
    /// Every call rescans; nothing is cached between calls.
    #[must_use]
    pub fn build(&self) -> ValidationContext {
        let outcome = ContentLoader::new(self.config.loader_config()).load_all();
        let definitions = load_schema_definitions(
            &self.config.resolve(&self.config.schema_definitions),
            self.config.max_file_size,
        );

        let mut context = ValidationContext::from_files(outcome.files)
            .with_schema_definitions(definitions);
        context.skipped_files = outcome.skipped;

        tracing::info!(
            files = context.content_files.len(),
            skipped = context.skipped_files.len(),
            urls = context.valid_urls.len(),
            schemas = context.available_schemas.len(),
            redirects = context.redirect_map.len(),
            "validation context built"
        );
        context
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validators::test_support::{content_file, with_redirects};
    use serde_json::json;
    use site_content::ContentType;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_files_builds_indexes() {
        let file = with_redirects(
            content_file(ContentType::Program, "web-development", "en"),
            &["/old-web"],
        );
        let context = ValidationContext::from_files(vec![file]);
        assert!(context.valid_urls.contains("/en/career-programs/web-development"));
        assert!(context.valid_urls.contains("/"));
        let entry = &context.redirect_map["/old-web"];
        assert_eq!(entry.target, "/en/career-programs/web-development");
        assert!(context.sitemap_entries.is_empty());
    }

    #[test]
    fn test_with_schema_definitions_flattens_keys() {
        let context = ValidationContext::default().with_schema_definitions(json!({
            "organization": {"@type": "Organization"},
            "courses": {"web": {}}
        }));
        assert!(context.available_schemas.contains("organization"));
        assert!(context.available_schemas.contains("courses:web"));
    }

    #[test]
    fn test_builder_rebuilds_on_every_call() {
        let tmp = TempDir::new().unwrap();
        let unit = tmp.path().join("src/content/pages/about");
        fs::create_dir_all(&unit).unwrap();
        fs::write(unit.join("en.yml"), "title: About\n").unwrap();

        let config = SiteConfig::from_root(tmp.path());
        let builder = ContextBuilder::new(&config);
        assert_eq!(builder.build().content_files.len(), 1);

        fs::write(unit.join("es.yml"), "title: Acerca\n").unwrap();
        fs::write(unit.join("broken.en.yml"), "title: [unclosed\n").unwrap();
        let rebuilt = builder.build();
        assert_eq!(rebuilt.content_files.len(), 2);
        assert_eq!(rebuilt.skipped_files.len(), 1);
        assert!(rebuilt.available_schemas.is_empty());
    }
}
