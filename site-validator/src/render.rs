//! Structured-data rendering.
//!
//! A [`SchemaRenderer`] turns one content file into the JSON-LD markup the
//! page will carry. [`DefinitionRenderer`] renders from the schema definition
//! document in the validation context.

use std::path::PathBuf;

use serde_json::{Map, Value, json};
use site_content::schema_keys::resolve_schema_definition;
use site_content::walk::collect_sections;
use site_content::{ContentFile, canonical_url};

use crate::context::ValidationContext;
use crate::validators::{
    Source, faq_category, faq_id, faq_ids, faq_source_entries, inline_faqs, is_faq_section,
    load_source,
};

const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Produces `<script type="application/ld+json">` markup for a page.
pub trait SchemaRenderer: Send + Sync {
    /// Render every structured-data block of `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's structured data cannot be rendered.
    fn render(&self, file: &ContentFile, context: &ValidationContext) -> anyhow::Result<String>;
}

/// Renders `schema.include` keys from the definition document, with
/// `schema.overrides` deep-merged on top, plus an `FAQPage` block for the
/// page's FAQ sections.
///
/// FAQ sections with inline items render those. Other FAQ sections select
/// entries from `{faq_dir}/{locale}.yml` by `faq_ids` and `category`, or show
/// the whole source when they name neither. Without a FAQ directory only
/// inline items render.
///
/// String values may use `{{title}}`, `{{slug}}`, `{{url}}`, `{{locale}}`
/// and `{{description}}`; any other `{{...}}` is left as is.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRenderer {
    faq_dir: Option<PathBuf>,
    max_file_size: u64,
}

/// Recursively merge `patch` into `base`. Non-object values replace.
fn merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

fn substitute(value: &mut Value, vars: &[(&str, &str)]) {
    match value {
        Value::String(s) if s.contains("{{") => {
            for (name, replacement) in vars {
                *s = s.replace(&format!("{{{{{name}}}}}"), replacement);
            }
        }
        Value::Array(items) => {
            for item in items {
                substitute(item, vars);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                substitute(item, vars);
            }
        }
        _ => {}
    }
}

fn script_block(value: &Value) -> anyhow::Result<String> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(format!(
        "<script type=\"application/ld+json\">\n{json}\n</script>"
    ))
}

fn faq_item(item: &Value) -> Option<Value> {
    let question = item.get("question").and_then(Value::as_str)?;
    let answer = item.get("answer").and_then(Value::as_str)?;
    Some(json!({
        "@type": "Question",
        "name": question,
        "acceptedAnswer": {"@type": "Answer", "text": answer},
    }))
}

/// Source entries a FAQ section shows: its `faq_ids` in order, then the
/// entries of its `category`, or every entry when it names neither.
fn select_faqs<'a>(entries: &'a [Value], section: &Value) -> Vec<&'a Value> {
    let ids = faq_ids(section);
    let category = faq_category(section);
    if ids.is_empty() && category.is_none() {
        return entries.iter().collect();
    }

    let has_id =
        |entry: &Value, id: &str| entry.get("id").and_then(faq_id).as_deref() == Some(id);
    let mut selected: Vec<&Value> = ids
        .iter()
        .filter_map(|id| entries.iter().find(|&entry| has_id(entry, id.as_str())))
        .collect();
    if let Some(category) = category {
        for entry in entries {
            let in_category =
                entry.get("category").and_then(Value::as_str).map(str::trim) == Some(category);
            if in_category && !selected.iter().any(|s| std::ptr::eq(*s, entry)) {
                selected.push(entry);
            }
        }
    }
    selected
}

impl DefinitionRenderer {
    /// Resolve FAQ sections against the per-locale sources in `faq_dir`.
    #[must_use]
    pub fn with_faq_dir(faq_dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            faq_dir: Some(faq_dir.into()),
            max_file_size,
        }
    }

    /// Entries of the FAQ source for `locale`. Unreadable sources render
    /// nothing; the `faqs` validator reports them.
    fn faq_source(&self, locale: &str) -> Vec<Value> {
        let Some(dir) = &self.faq_dir else {
            return Vec::new();
        };
        let path = dir.join(format!("{locale}.yml"));
        match load_source(&path, self.max_file_size) {
            Source::Loaded(value) => faq_source_entries(&value)
                .map(<[Value]>::to_vec)
                .unwrap_or_default(),
            Source::Missing => Vec::new(),
            Source::Invalid(e) => {
                tracing::debug!(error = %e, "FAQ source unreadable, no entries rendered");
                Vec::new()
            }
        }
    }

    /// `FAQPage` for every FAQ item the page shows, if there are any.
    fn faq_page(&self, file: &ContentFile) -> Option<Value> {
        let mut source: Option<Vec<Value>> = None;
        let mut questions = Vec::new();
        for (_, section) in collect_sections(&file.data) {
            if !is_faq_section(section) {
                continue;
            }
            if let Some(inline) = inline_faqs(section) {
                questions.extend(inline.as_array().into_iter().flatten().filter_map(faq_item));
                continue;
            }
            let entries = source.get_or_insert_with(|| self.faq_source(&file.locale));
            questions.extend(select_faqs(entries, section).into_iter().filter_map(faq_item));
        }
        (!questions.is_empty()).then(|| {
            json!({
                "@context": SCHEMA_CONTEXT,
                "@type": "FAQPage",
                "mainEntity": questions,
            })
        })
    }
}

impl SchemaRenderer for DefinitionRenderer {
    fn render(&self, file: &ContentFile, context: &ValidationContext) -> anyhow::Result<String> {
        let url = canonical_url(file);
        let description = file.meta_description().unwrap_or_default();
        let vars = [
            ("title", file.title.as_str()),
            ("slug", file.slug.as_str()),
            ("url", url.as_str()),
            ("locale", file.locale.as_str()),
            ("description", description),
        ];

        let mut blocks = Vec::new();
        let schema = file.schema.as_ref();
        let include = schema.and_then(|s| s.include.as_deref()).unwrap_or_default();

        for key in include {
            let Some(definition) = resolve_schema_definition(&context.schema_definitions, key)
            else {
                tracing::debug!(key = %key, file = %file.file_path.display(), "unknown schema key, not rendered");
                continue;
            };
            if !definition.is_object() {
                anyhow::bail!("schema definition '{key}' is not a mapping");
            }
            let mut rendered = definition.clone();
            if let Some(patch) = schema.and_then(|s| s.overrides.get(key)) {
                merge(&mut rendered, patch);
            }
            if let Value::Object(map) = &mut rendered
                && !map.contains_key("@context")
            {
                let mut with_context = Map::new();
                with_context.insert("@context".to_owned(), Value::from(SCHEMA_CONTEXT));
                with_context.append(map);
                *map = with_context;
            }
            substitute(&mut rendered, &vars);
            blocks.push(script_block(&rendered)?);
        }

        if let Some(page) = self.faq_page(file) {
            blocks.push(script_block(&page)?);
        }
        Ok(blocks.join("\n"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validators::test_support::{content_file, context, with_data, with_schema};
    use site_content::{ContentType, SchemaConfig};
    use std::collections::BTreeMap;

    fn definitions() -> Value {
        json!({
            "organization": {
                "@type": "Organization",
                "name": "Coding Academy",
                "address": {"addressLocality": "Miami", "postalCode": "33130"}
            },
            "courses": {
                "web": {"@type": "Course", "name": "{{title}}", "url": "{{url}}", "note": "{{unknown}}"}
            }
        })
    }

    #[test]
    fn test_renders_included_keys_with_overrides() {
        let file = with_schema(
            content_file(ContentType::Program, "web", "en"),
            SchemaConfig {
                include: Some(vec!["organization".to_owned(), "courses:web".to_owned()]),
                overrides: BTreeMap::from([(
                    "organization".to_owned(),
                    json!({"address": {"addressLocality": "Madrid"}}),
                )]),
            },
        );
        let ctx = context(vec![]).with_schema_definitions(definitions());
        let html = DefinitionRenderer::default().render(&file, &ctx).unwrap();
        assert_eq!(html.matches("application/ld+json").count(), 2);
        assert!(html.contains("\"addressLocality\": \"Madrid\""));
        assert!(html.contains("\"postalCode\": \"33130\""));
        assert!(html.contains("\"@context\": \"https://schema.org\""));
        assert!(html.contains("/en/career-programs/web"));
        assert!(html.contains("{{unknown}}"));
    }

    #[test]
    fn test_faq_page_from_inline_items() {
        let file = with_data(
            content_file(ContentType::Page, "faq", "en"),
            json!({"sections": [{"type": "faq", "faqs": [
                {"question": "Is there financing?", "answer": "Yes."},
                {"question": "Incomplete"}
            ]}]}),
        );
        let html = DefinitionRenderer::default().render(&file, &context(vec![])).unwrap();
        assert!(html.contains("\"FAQPage\""));
        assert_eq!(html.matches("\"Question\"").count(), 1);
    }

    const FAQ_SOURCE: &str = "\
faqs:
  - id: cost
    question: How much does it cost?
    answer: It depends on the program.
    category: pricing
  - id: duration
    question: How long is it?
    answer: Sixteen weeks.
    category: programs
  - id: schedule
    question: Is it part time?
    answer: Both options exist.
    category: programs
";

    fn questions(html: &str) -> Vec<String> {
        let start = html.find('{').unwrap();
        let end = html.rfind('}').unwrap();
        let page: Value = serde_json::from_str(&html[start..=end]).unwrap();
        page["mainEntity"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["name"].as_str().unwrap().to_owned())
            .collect()
    }

    #[test]
    fn test_faq_page_resolves_source_entries() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("en.yml"), FAQ_SOURCE).unwrap();
        let renderer = DefinitionRenderer::with_faq_dir(tmp.path(), 1 << 20);
        let render = |locale: &str, section: Value| {
            let file = with_data(
                content_file(ContentType::Page, "help", locale),
                json!({ "sections": [section] }),
            );
            renderer.render(&file, &context(vec![])).unwrap()
        };

        let by_id = render(
            "en",
            json!({"type": "faq", "faq_ids": ["schedule", "cost", "refunds"]}),
        );
        assert_eq!(
            questions(&by_id),
            vec!["Is it part time?", "How much does it cost?"]
        );

        let by_category = render("en", json!({"type": "faqs", "category": "programs"}));
        assert_eq!(
            questions(&by_category),
            vec!["How long is it?", "Is it part time?"]
        );

        let everything = render("en", json!({"type": "faq"}));
        assert_eq!(questions(&everything).len(), 3);

        assert!(render("es", json!({"type": "faq", "faq_ids": ["cost"]})).is_empty());
    }

    #[test]
    fn test_faq_sources_ignored_without_faq_dir() {
        let file = with_data(
            content_file(ContentType::Page, "help", "en"),
            json!({"sections": [{"type": "faq", "faq_ids": ["cost"]}]}),
        );
        let html = DefinitionRenderer::default().render(&file, &context(vec![])).unwrap();
        assert!(html.is_empty());
    }

    #[test]
    fn test_non_mapping_definition_is_error() {
        let file = with_schema(
            content_file(ContentType::Page, "about", "en"),
            SchemaConfig {
                include: Some(vec!["organization".to_owned()]),
                overrides: BTreeMap::new(),
            },
        );
        let ctx = context(vec![]).with_schema_definitions(json!({"organization": "oops"}));
        assert!(DefinitionRenderer::default().render(&file, &ctx).is_err());
    }

    #[test]
    fn test_merge_replaces_scalars_and_recurses() {
        let mut base = json!({"a": {"b": 1, "c": 2}, "d": [1]});
        merge(&mut base, &json!({"a": {"b": 9}, "d": [2, 3]}));
        assert_eq!(base, json!({"a": {"b": 9, "c": 2}, "d": [2, 3]}));
    }
}
