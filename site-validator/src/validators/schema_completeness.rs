//! Rendered structured data: valid JSON-LD, no placeholders left behind,
//! and an `FAQPage` wherever a page shows FAQs.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use site_content::ContentFile;
use site_content::walk::{collect_sections, walk_strings};

use super::is_faq_section;
use crate::context::ValidationContext;
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::render::{DefinitionRenderer, SchemaRenderer};
use crate::report::{ResultBuilder, ValidatorResult};

#[allow(clippy::expect_used)]
static JSON_LD_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bTODO\b|\bTBD\b|\bFIXME\b|\{\{[^}]*\}\}|lorem ipsum").expect("valid regex")
});

fn declares_type(value: &Value, wanted: &str) -> bool {
    let own = match value.get("@type") {
        Some(Value::String(t)) => t == wanted,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(wanted)),
        _ => false,
    };
    own || value
        .get("@graph")
        .and_then(Value::as_array)
        .is_some_and(|nodes| nodes.iter().any(|n| declares_type(n, wanted)))
}

fn declares_any(value: &Value, wanted: &str) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|v| declares_type(v, wanted)),
        other => declares_type(other, wanted),
    }
}

pub struct SchemaCompletenessValidator {
    renderer: Box<dyn SchemaRenderer>,
}

impl Default for SchemaCompletenessValidator {
    fn default() -> Self {
        Self::with_renderer(Box::new(DefinitionRenderer::default()))
    }
}

impl std::fmt::Debug for SchemaCompletenessValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCompletenessValidator")
            .finish_non_exhaustive()
    }
}

impl SchemaCompletenessValidator {
    /// Render with [`DefinitionRenderer`], resolving FAQ sections from `faq_dir`.
    #[must_use]
    pub fn new(faq_dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self::with_renderer(Box::new(DefinitionRenderer::with_faq_dir(
            faq_dir,
            max_file_size,
        )))
    }

    #[must_use]
    pub fn with_renderer(renderer: Box<dyn SchemaRenderer>) -> Self {
        Self { renderer }
    }

    /// Check one page; returns the number of JSON-LD blocks inspected.
    fn check_file(
        &self,
        file: &ContentFile,
        context: &ValidationContext,
        result: &mut ResultBuilder,
    ) -> usize {
        let has_faq_section = collect_sections(&file.data)
            .iter()
            .any(|(_, section)| is_faq_section(section));
        let configured = has_faq_section
            || file
                .schema
                .as_ref()
                .and_then(|s| s.include.as_ref())
                .is_some_and(|include| !include.is_empty());
        if !configured {
            return 0;
        }

        let html = match self.renderer.render(file, context) {
            Ok(html) => html,
            Err(e) => {
                result.push(
                    ValidationIssue::error(
                        IssueCode::SchemaRenderError,
                        format!("Structured data failed to render: {e:#}"),
                    )
                    .with_file(&file.file_path),
                );
                return 0;
            }
        };

        let blocks: Vec<&str> = JSON_LD_BLOCK
            .captures_iter(&html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();
        if blocks.iter().all(|b| b.trim().is_empty()) {
            result.push(
                ValidationIssue::warning(
                    IssueCode::EmptySchemaOutput,
                    format!("{} is configured for structured data but renders none", file.label()),
                )
                .with_file(&file.file_path),
            );
            return blocks.len();
        }

        let mut has_faq_page = false;
        for (idx, block) in blocks.iter().enumerate() {
            let value: Value = match serde_json::from_str(block) {
                Ok(v) => v,
                Err(e) => {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::InvalidJsonLd,
                            format!("JSON-LD block {} is not valid JSON: {e}", idx + 1),
                        )
                        .with_file(&file.file_path),
                    );
                    continue;
                }
            };
            has_faq_page |= declares_any(&value, "FAQPage");

            walk_strings(&value, "$", &mut |path, s| {
                for found in PLACEHOLDER.find_iter(s) {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::SchemaPlaceholder,
                            format!(
                                "JSON-LD block {} has placeholder '{}' at {path}",
                                idx + 1,
                                found.as_str()
                            ),
                        )
                        .with_file(&file.file_path)
                        .with_suggestion("Replace the placeholder with real content or an override"),
                    );
                }
            });
        }

        if has_faq_section && !has_faq_page {
            result.push(
                ValidationIssue::warning(
                    IssueCode::MissingFaqSchema,
                    format!("{} shows FAQs but renders no FAQPage", file.label()),
                )
                .with_file(&file.file_path)
                .with_suggestion("Reference existing FAQ entries or give the section inline items"),
            );
        }
        blocks.len()
    }
}

impl Validator for SchemaCompletenessValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "schema-completeness",
            description: "Renders each page's structured data and checks it for invalid JSON-LD and placeholders",
            category: ValidatorCategory::Seo,
            api_exposed: false,
            estimated_duration: EstimatedDuration::Slow,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());
        let mut pages = 0_usize;
        let mut blocks = 0_usize;
        for file in context.base_files() {
            pages += 1;
            blocks += self.check_file(file, context, &mut result);
        }
        result.artifact("pagesRendered", pages);
        result.artifact("blocksChecked", blocks);
        Ok(result.finish())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validators::test_support::{content_file, context, with_data, with_schema};
    use serde_json::json;
    use site_content::{ContentType, SchemaConfig};
    use std::collections::BTreeMap;

    struct FixedRenderer(&'static str);

    impl SchemaRenderer for FixedRenderer {
        fn render(&self, _: &ContentFile, _: &ValidationContext) -> anyhow::Result<String> {
            Ok(self.0.to_owned())
        }
    }

    struct FailingRenderer;

    impl SchemaRenderer for FailingRenderer {
        fn render(&self, _: &ContentFile, _: &ValidationContext) -> anyhow::Result<String> {
            anyhow::bail!("template exploded")
        }
    }

    fn configured_page() -> ContentFile {
        with_schema(
            content_file(ContentType::Page, "about", "en"),
            SchemaConfig {
                include: Some(vec!["organization".to_owned()]),
                overrides: BTreeMap::new(),
            },
        )
    }

    fn run_with(renderer: Box<dyn SchemaRenderer>, file: ContentFile) -> ValidatorResult {
        SchemaCompletenessValidator::with_renderer(renderer)
            .run(&context(vec![file]))
            .unwrap()
    }

    #[test]
    fn test_default_renderer_clean_output_passes() {
        let ctx = context(vec![configured_page()]).with_schema_definitions(json!({
            "organization": {"@type": "Organization", "name": "{{title}}"}
        }));
        let result = SchemaCompletenessValidator::default().run(&ctx).unwrap();
        assert!(result.errors().is_empty(), "{:?}", result.errors());
        assert!(result.warnings().is_empty());
        assert_eq!(result.artifacts().unwrap()["blocksChecked"], 1);
    }

    #[test]
    fn test_placeholders_reported_per_occurrence() {
        let html = r#"<script type="application/ld+json">{"name": "TODO", "description": "Lorem ipsum TBD", "url": "{{canonical}}"}</script>"#;
        let result = run_with(Box::new(FixedRenderer(html)), configured_page());
        let placeholders = result
            .errors()
            .iter()
            .filter(|e| e.code == IssueCode::SchemaPlaceholder)
            .count();
        assert_eq!(placeholders, 4);
    }

    #[test]
    fn test_words_containing_todo_are_not_placeholders() {
        let html = r#"<script type="application/ld+json">{"name": "Mastodon tooling"}</script>"#;
        let result = run_with(Box::new(FixedRenderer(html)), configured_page());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_invalid_json_and_empty_output() {
        let bad = run_with(
            Box::new(FixedRenderer(r#"<script type="application/ld+json">{"name": </script>"#)),
            configured_page(),
        );
        assert!(bad.has_code(IssueCode::InvalidJsonLd));

        let empty = run_with(Box::new(FixedRenderer("")), configured_page());
        assert!(empty.errors().is_empty());
        assert!(empty.has_code(IssueCode::EmptySchemaOutput));
    }

    #[test]
    fn test_render_error_is_isolated_to_the_page() {
        let result = run_with(Box::new(FailingRenderer), configured_page());
        let issue = &result.errors()[0];
        assert_eq!(issue.code, IssueCode::SchemaRenderError);
        assert!(issue.message.contains("template exploded"));
    }

    #[test]
    fn test_faq_sections_resolved_from_faq_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("en.yml"),
            "faqs:\n  - id: cost\n    question: How much is it?\n    answer: It depends.\n",
        )
        .unwrap();
        let validator = SchemaCompletenessValidator::new(tmp.path(), 1 << 20);
        let page = |sections: Value| {
            with_data(
                content_file(ContentType::Page, "help", "en"),
                json!({ "sections": sections }),
            )
        };

        for section in [
            json!({"type": "faq", "faq_ids": ["cost"]}),
            json!({"type": "faq"}),
        ] {
            let result = validator.run(&context(vec![page(json!([section]))])).unwrap();
            assert!(result.errors().is_empty(), "{:?}", result.errors());
            assert!(result.warnings().is_empty(), "{:?}", result.warnings());
        }

        let unknown = validator
            .run(&context(vec![page(json!([{"type": "faq", "faq_ids": ["refunds"]}]))]))
            .unwrap();
        assert!(unknown.has_code(IssueCode::EmptySchemaOutput));
    }

    #[test]
    fn test_faq_section_without_faq_page() {
        let file = with_data(
            content_file(ContentType::Page, "help", "en"),
            json!({"sections": [{"type": "faq", "faq_ids": ["cost"]}]}),
        );
        let html = r#"<script type="application/ld+json">{"@type": "Organization", "name": "Academy"}</script>"#;
        let result = run_with(Box::new(FixedRenderer(html)), file);
        assert!(result.has_code(IssueCode::MissingFaqSchema));

        let graph = r#"<script type="application/ld+json">{"@graph": [{"@type": "FAQPage"}]}</script>"#;
        let file = with_data(
            content_file(ContentType::Page, "help", "en"),
            json!({"sections": [{"type": "faq"}]}),
        );
        let result = run_with(Box::new(FixedRenderer(graph)), file);
        assert!(!result.has_code(IssueCode::MissingFaqSchema));
    }
}
