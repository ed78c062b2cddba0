//! Structured-data references in `schema` blocks.

use crate::context::ValidationContext;
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl Validator for SchemaValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "schema",
            description: "Checks that schema.include and schema.overrides reference defined schema keys",
            category: ValidatorCategory::Integrity,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Fast,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());
        let available = &context.available_schemas;
        let available_list = available.iter().cloned().collect::<Vec<_>>().join(", ");
        let mut references = 0_usize;

        for file in &context.content_files {
            let Some(schema) = &file.schema else {
                continue;
            };

            if let Some(include) = &schema.include {
                if include.is_empty() {
                    result.push(
                        ValidationIssue::warning(
                            IssueCode::EmptySchemaInclude,
                            format!("{} has an empty schema.include list", file.label()),
                        )
                        .with_file(&file.file_path)
                        .with_suggestion("Remove schema.include or list at least one schema key"),
                    );
                }
                for key in include {
                    references += 1;
                    if !available.contains(key) {
                        result.push(
                            ValidationIssue::error(
                                IssueCode::InvalidSchemaRef,
                                format!("schema.include references unknown key '{key}'"),
                            )
                            .with_file(&file.file_path)
                            .with_suggestion(format!("Available keys: {available_list}")),
                        );
                    }
                }
            }

            for key in schema.overrides.keys() {
                references += 1;
                if !available.contains(key) {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::InvalidSchemaOverride,
                            format!("schema.overrides targets unknown key '{key}'"),
                        )
                        .with_file(&file.file_path)
                        .with_suggestion(format!("Available keys: {available_list}")),
                    );
                }
            }
        }

        result.artifact("availableSchemas", available.len());
        result.artifact("referencesChecked", references);
        Ok(result.finish())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validators::test_support::{content_file, context, with_schema};
    use serde_json::json;
    use site_content::{ContentType, SchemaConfig};
    use std::collections::BTreeMap;

    fn run(schema: SchemaConfig) -> ValidatorResult {
        let file = with_schema(content_file(ContentType::Program, "web", "en"), schema);
        let ctx = context(vec![file]).with_schema_definitions(json!({
            "organization": {"@type": "Organization"},
            "courses": {"web_dev": {"@type": "Course"}}
        }));
        SchemaValidator.run(&ctx).unwrap()
    }

    #[test]
    fn test_known_refs_pass() {
        let result = run(SchemaConfig {
            include: Some(vec!["organization".to_owned(), "courses:web_dev".to_owned()]),
            overrides: BTreeMap::from([("organization".to_owned(), json!({"name": "X"}))]),
        });
        assert_eq!(result.status(), crate::report::ValidatorStatus::Passed);
    }

    #[test]
    fn test_unknown_include_cites_available_keys() {
        let result = run(SchemaConfig {
            include: Some(vec!["courses".to_owned()]),
            overrides: BTreeMap::new(),
        });
        let issue = &result.errors()[0];
        assert_eq!(issue.code, IssueCode::InvalidSchemaRef);
        assert!(
            issue
                .suggestion
                .as_deref()
                .unwrap()
                .contains("courses:web_dev, organization")
        );
    }

    #[test]
    fn test_unknown_override_is_error() {
        let result = run(SchemaConfig {
            include: None,
            overrides: BTreeMap::from([("faq".to_owned(), json!({}))]),
        });
        assert!(result.has_code(IssueCode::InvalidSchemaOverride));
    }

    #[test]
    fn test_empty_include_is_warning() {
        let result = run(SchemaConfig {
            include: Some(vec![]),
            overrides: BTreeMap::new(),
        });
        assert!(result.errors().is_empty());
        assert!(result.has_code(IssueCode::EmptySchemaInclude));
    }
}
