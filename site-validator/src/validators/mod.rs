//! The built-in validators.

mod backgrounds;
mod components;
mod content_quality;
mod faqs;
mod images;
mod meta;
pub mod redirects;
mod schema;
mod schema_completeness;
mod seo;
mod sitemap;

pub use backgrounds::BackgroundsValidator;
pub use components::ComponentsValidator;
pub use content_quality::ContentQualityValidator;
pub use faqs::FaqsValidator;
pub use images::ImagesValidator;
pub use meta::MetaValidator;
pub use redirects::{RedirectAnalysis, RedirectsValidator, analyze_redirects};
pub use schema::SchemaValidator;
pub use schema_completeness::SchemaCompletenessValidator;
pub use seo::SeoValidator;
pub use sitemap::SitemapValidator;

use std::path::Path;

use serde_json::Value;
use site_content::ContentError;
use site_content::yaml::read_yaml_file;

/// Outcome of reading an optional YAML source (theme, registry, FAQ file).
#[derive(Debug)]
pub(crate) enum Source {
    Missing,
    Invalid(ContentError),
    Loaded(Value),
}

pub(crate) fn load_source(path: &Path, max_file_size: u64) -> Source {
    if !path.is_file() {
        return Source::Missing;
    }
    match read_yaml_file(path, max_file_size) {
        Ok(value) => Source::Loaded(value),
        Err(e) => Source::Invalid(e),
    }
}

/// Whether a section renders FAQs (`type: faq` or `type: faqs`).
pub(crate) fn is_faq_section(section: &Value) -> bool {
    section
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| matches!(t.trim().to_ascii_lowercase().as_str(), "faq" | "faqs"))
}

/// FAQ id as written: a non-blank string or a number.
pub(crate) fn faq_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A FAQ section's `faq_ids`. A single id may be written as a scalar.
pub(crate) fn faq_ids(section: &Value) -> Vec<String> {
    match section.get("faq_ids") {
        Some(Value::Array(items)) => items.iter().filter_map(faq_id).collect(),
        Some(other) => faq_id(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// A FAQ section's non-blank `category`.
pub(crate) fn faq_category(section: &Value) -> Option<&str> {
    section
        .get("category")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
}

/// Items a FAQ section carries inline (`faqs` or `items`).
pub(crate) fn inline_faqs(section: &Value) -> Option<&Value> {
    section.get("faqs").or_else(|| section.get("items"))
}

/// Entries of a parsed FAQ source: a bare list or a `faqs:` list.
pub(crate) fn faq_source_entries(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("faqs").and_then(Value::as_array).map(Vec::as_slice),
        _ => None,
    }
}

/// Path component of a URL-ish string: scheme and host, query and fragment
/// are dropped. Returns `None` for external URLs (other hosts are not ours to
/// check) and for non-path values such as `mailto:` links.
pub(crate) fn site_path(url: &str) -> Option<&str> {
    let url = url.trim();
    if url.starts_with("//") || url.contains("://") {
        return None;
    }
    if !url.starts_with('/') {
        return None;
    }
    let end = url.find(['?', '#']).unwrap_or(url.len());
    Some(&url[..end])
}

/// Strip scheme and host from an absolute URL, keeping the path.
pub(crate) fn url_path(url: &str) -> &str {
    let url = url.trim();
    let without_scheme = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => return site_path(url).unwrap_or(url),
    };
    let path = without_scheme
        .find('/')
        .map_or("/", |idx| &without_scheme[idx..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use serde_json::{Value, json};
    use site_content::{ContentFile, ContentMeta, ContentType, SchemaConfig};

    use crate::context::ValidationContext;

    pub fn content_file(content_type: ContentType, slug: &str, locale: &str) -> ContentFile {
        ContentFile {
            slug: slug.to_owned(),
            title: slug.to_owned(),
            content_type,
            locale: locale.to_owned(),
            file_path: PathBuf::from(format!(
                "/site/src/content/{}/{slug}/{locale}.yml",
                content_type.dir_name()
            )),
            variant: None,
            version: None,
            meta: None,
            schema: None,
            data: json!({"sections": [{"type": "hero"}]}),
        }
    }

    pub fn with_meta(mut file: ContentFile, meta: ContentMeta) -> ContentFile {
        file.meta = Some(meta);
        file
    }

    pub fn with_schema(mut file: ContentFile, schema: SchemaConfig) -> ContentFile {
        file.schema = Some(schema);
        file
    }

    pub fn with_data(mut file: ContentFile, data: Value) -> ContentFile {
        file.data = data;
        file
    }

    pub fn with_redirects(file: ContentFile, redirects: &[&str]) -> ContentFile {
        let mut meta = file.meta.clone().unwrap_or_default();
        meta.redirects = redirects.iter().map(|r| (*r).to_owned()).collect();
        with_meta(file, meta)
    }

    pub fn as_variant(mut file: ContentFile, variant: &str, version: u32) -> ContentFile {
        file.file_path = file
            .file_path
            .with_file_name(format!("{variant}.v{version}.{}.yml", file.locale));
        file.variant = Some(variant.to_owned());
        file.version = Some(version);
        file
    }

    pub fn context(files: Vec<ContentFile>) -> ValidationContext {
        ValidationContext::from_files(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_path_keeps_local_paths_only() {
        assert_eq!(site_path("/en/apply?ref=nav#form"), Some("/en/apply"));
        assert_eq!(site_path("https://example.com/en"), None);
        assert_eq!(site_path("//cdn.example.com/x.png"), None);
        assert_eq!(site_path("mailto:hi@example.com"), None);
    }

    #[test]
    fn test_faq_section_fields() {
        let section = json!({"type": "faq", "faq_ids": ["cost", 7, " "], "category": " pricing "});
        assert_eq!(faq_ids(&section), vec!["cost".to_owned(), "7".to_owned()]);
        assert_eq!(faq_category(&section), Some("pricing"));
        assert!(inline_faqs(&section).is_none());
        assert_eq!(faq_ids(&json!({"faq_ids": "cost"})), vec!["cost".to_owned()]);

        assert_eq!(faq_source_entries(&json!({"faqs": [{"id": "a"}]})).map(<[Value]>::len), Some(1));
        assert_eq!(faq_source_entries(&json!([{"id": "a"}, {"id": "b"}])).map(<[Value]>::len), Some(2));
        assert!(faq_source_entries(&json!({"faqs": {"id": "a"}})).is_none());
    }

    #[test]
    fn test_url_path_strips_host() {
        assert_eq!(url_path("https://example.com/en/apply/?x=1"), "/en/apply/");
        assert_eq!(url_path("https://example.com"), "/");
        assert_eq!(url_path("/es/contacto"), "/es/contacto");
    }
}
