//! Content descriptors produced by the loader.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default locale for files without a locale suffix.
pub const DEFAULT_LOCALE: &str = "en";

/// The four top-level content collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Program,
    Landing,
    Location,
    Page,
}

impl ContentType {
    /// Scan order used by the loader.
    pub const ALL: [Self; 4] = [Self::Program, Self::Landing, Self::Location, Self::Page];

    /// Directory name of this collection under the content root.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Program => "programs",
            Self::Landing => "landings",
            Self::Location => "locations",
            Self::Page => "pages",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::Landing => "landing",
            Self::Location => "location",
            Self::Page => "page",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `meta.priority` as written.
///
/// Quoted numbers are accepted. Anything else is kept verbatim so the `meta`
/// check can report it instead of the file being dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Priority {
    Number(f64),
    Text(String),
}

impl Priority {
    /// Numeric value, if the priority is a finite number or a quoted one.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl From<f64> for Priority {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => write!(f, "'{text}'"),
        }
    }
}

/// SEO metadata block (`meta:`) of a content file.
///
/// Fields are read leniently: scalars of the wrong kind are coerced to text,
/// and sequences or mappings where a scalar is expected are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentMeta {
    #[serde(deserialize_with = "lenient_text")]
    pub page_title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub robots: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub og_image: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub canonical_url: Option<String>,
    /// Sitemap priority; expected in `[0, 1]`.
    #[serde(deserialize_with = "lenient_priority")]
    pub priority: Option<Priority>,
    /// Sitemap change frequency. Kept as free text so invalid values reach the validators.
    #[serde(deserialize_with = "lenient_text")]
    pub change_frequency: Option<String>,
    /// Legacy paths that should redirect to this file's canonical URL.
    /// A single path may be written as a scalar.
    #[serde(deserialize_with = "lenient_list")]
    pub redirects: Vec<String>,
}

/// Structured-data block (`schema:`) of a content file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Schema keys to render. `Some(vec![])` is an explicit empty list.
    #[serde(deserialize_with = "lenient_opt_list")]
    pub include: Option<Vec<String>>,
    /// Per-key field overrides merged into the rendered definition.
    #[serde(deserialize_with = "lenient_map")]
    pub overrides: BTreeMap<String, Value>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn text_list(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::Array(items) => Some(items.into_iter().filter_map(scalar_text).collect()),
        scalar => scalar_text(scalar).map(|text| vec![text]),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Value::deserialize(deserializer).map(scalar_text)
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Value::deserialize(deserializer).map(|v| text_list(v).unwrap_or_default())
}

fn lenient_opt_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Value::deserialize(deserializer).map(text_list)
}

fn lenient_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_priority<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Priority>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(Priority::Number),
        Value::String(text) => Some(Priority::Text(text)),
        other => Some(Priority::Text(other.to_string())),
    })
}

/// Descriptor for one parsed content file.
///
/// `file_path` is the identity key. `(content_type, slug, locale, variant, version)`
/// maps to at most one file on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFile {
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub locale: String,
    pub file_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ContentMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaConfig>,
    /// The whole parsed document.
    #[serde(skip)]
    pub data: Value,
}

impl ContentFile {
    /// Base content is the non-variant rendition of a page.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.variant.is_none()
    }

    /// `meta.page_title` if present and non-blank.
    #[must_use]
    pub fn page_title(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.page_title.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    /// `meta.description` if present and non-blank.
    #[must_use]
    pub fn meta_description(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.description.as_deref())
            .filter(|d| !d.trim().is_empty())
    }

    /// `meta.redirects`, empty when there is no meta block.
    #[must_use]
    pub fn redirects(&self) -> &[String] {
        self.meta
            .as_ref()
            .map(|m| m.redirects.as_slice())
            .unwrap_or_default()
    }

    /// Whether `meta.robots` contains a `noindex` (or `none`) directive.
    #[must_use]
    pub fn is_noindex(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|m| m.robots.as_deref())
            .is_some_and(|robots| {
                robots
                    .split(',')
                    .map(|t| t.trim().to_ascii_lowercase())
                    .any(|t| t == "noindex" || t == "none")
            })
    }

    /// Top-level `sections` array, if the document has one.
    #[must_use]
    pub fn sections(&self) -> Option<&Vec<Value>> {
        self.data.get("sections").and_then(Value::as_array)
    }

    /// Short label used in issue messages: `type/slug (locale)`.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.variant, self.version) {
            (Some(variant), Some(version)) => format!(
                "{}/{} ({}, {variant} v{version})",
                self.content_type, self.slug, self.locale
            ),
            _ => format!("{}/{} ({})", self.content_type, self.slug, self.locale),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file_with_meta(meta: Option<ContentMeta>) -> ContentFile {
        ContentFile {
            slug: "web-development".to_owned(),
            title: "Web Development".to_owned(),
            content_type: ContentType::Program,
            locale: "en".to_owned(),
            file_path: PathBuf::from("/content/programs/web-development/en.yml"),
            variant: None,
            version: None,
            meta,
            schema: None,
            data: json!({}),
        }
    }

    #[test]
    fn test_content_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ContentType::Location).unwrap(),
            json!("location")
        );
        assert_eq!(ContentType::Landing.dir_name(), "landings");
    }

    #[test]
    fn test_meta_accepts_partial_blocks() {
        let meta: ContentMeta =
            serde_json::from_value(json!({"page_title": "Hi", "priority": 0.5})).unwrap();
        assert_eq!(meta.page_title.as_deref(), Some("Hi"));
        assert!(
            meta.priority
                .and_then(|p| p.value())
                .is_some_and(|p| (p - 0.5).abs() < f64::EPSILON)
        );
        assert!(meta.redirects.is_empty());
    }

    #[test]
    fn test_mistyped_meta_fields_are_coerced_not_rejected() {
        let meta: ContentMeta = serde_json::from_value(json!({
            "page_title": 2024,
            "description": ["not", "text"],
            "priority": "0.8",
            "redirects": "/old-path",
        }))
        .unwrap();
        assert_eq!(meta.page_title.as_deref(), Some("2024"));
        assert!(meta.description.is_none());
        assert_eq!(meta.priority, Some(Priority::Text("0.8".to_owned())));
        assert!(
            meta.priority
                .and_then(|p| p.value())
                .is_some_and(|p| (p - 0.8).abs() < f64::EPSILON)
        );
        assert_eq!(meta.redirects, vec!["/old-path".to_owned()]);
    }

    #[test]
    fn test_priority_value() {
        let close = |p: Priority, expected: f64| {
            p.value()
                .is_some_and(|v| (v - expected).abs() < f64::EPSILON)
        };
        assert!(close(Priority::from(0.3), 0.3));
        assert!(close(Priority::Text(" 1 ".to_owned()), 1.0));
        assert!(Priority::Text("high".to_owned()).value().is_none());
        assert!(Priority::Text("NaN".to_owned()).value().is_none());
        assert_eq!(Priority::Text("high".to_owned()).to_string(), "'high'");
    }

    #[test]
    fn test_schema_block_tolerates_scalars() {
        let schema: SchemaConfig =
            serde_json::from_value(json!({"include": "organization", "overrides": "none"})).unwrap();
        assert_eq!(schema.include, Some(vec!["organization".to_owned()]));
        assert!(schema.overrides.is_empty());
    }

    #[test]
    fn test_schema_include_distinguishes_empty_from_absent() {
        let absent: SchemaConfig = serde_json::from_value(json!({})).unwrap();
        let empty: SchemaConfig = serde_json::from_value(json!({"include": []})).unwrap();
        assert!(absent.include.is_none());
        assert_eq!(empty.include, Some(vec![]));
    }

    #[test]
    fn test_noindex_detection() {
        let meta = ContentMeta {
            robots: Some("NoIndex, follow".to_owned()),
            ..ContentMeta::default()
        };
        assert!(file_with_meta(Some(meta)).is_noindex());
        assert!(!file_with_meta(None).is_noindex());
    }

    #[test]
    fn test_blank_title_is_treated_as_missing() {
        let meta = ContentMeta {
            page_title: Some("   ".to_owned()),
            ..ContentMeta::default()
        };
        assert!(file_with_meta(Some(meta)).page_title().is_none());
    }

    #[test]
    fn test_serialized_descriptor_omits_data() {
        let value = serde_json::to_value(file_with_meta(None)).unwrap();
        assert_eq!(value["type"], "program");
        assert_eq!(value["filePath"], "/content/programs/web-development/en.yml");
        assert!(value.get("data").is_none());
        assert!(value.get("variant").is_none());
    }
}
