//! Background references against the theme palette.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde_json::Value;
use site_content::walk::collect_strings_for_keys;

use super::{Source, load_source};
use crate::context::ValidationContext;
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

/// Content keys holding a background reference.
pub const BACKGROUND_KEYS: &[&str] = &["background", "background_color", "bg"];

/// Keys that make a mapping a usable background definition.
const DEFINITION_KEYS: &[&str] = &["value", "color", "gradient", "image", "class"];

/// Raw CSS is allowed in place of a palette name.
fn is_inline_css(value: &str) -> bool {
    let v = value.trim().to_ascii_lowercase();
    v.starts_with('#')
        || v.starts_with("rgb(")
        || v.starts_with("rgba(")
        || v.starts_with("hsl(")
        || v.starts_with("hsla(")
        || v.starts_with("var(")
        || v.starts_with("url(")
        || v.contains("gradient(")
        || matches!(v.as_str(), "transparent" | "none" | "inherit")
}

fn is_valid_definition(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => DEFINITION_KEYS.iter().any(|k| {
            map.get(*k)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty())
        }),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct BackgroundsValidator {
    theme_path: PathBuf,
    max_file_size: u64,
}

impl BackgroundsValidator {
    #[must_use]
    pub fn new(theme_path: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            theme_path: theme_path.into(),
            max_file_size,
        }
    }

    /// Palette names, or `None` after reporting why none is available.
    fn load_palette(&self, result: &mut ResultBuilder) -> Option<BTreeSet<String>> {
        let theme = match load_source(&self.theme_path, self.max_file_size) {
            Source::Loaded(theme) => theme,
            Source::Missing => {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::ThemeNotFound,
                        format!("Theme file not found at {}", self.theme_path.display()),
                    )
                    .with_suggestion("Set theme in site-validator.yml"),
                );
                return None;
            }
            Source::Invalid(e) => {
                result.push(
                    ValidationIssue::error(IssueCode::InvalidThemeSource, e.to_string())
                        .with_file(&self.theme_path),
                );
                return None;
            }
        };

        let Some(backgrounds) = theme.get("backgrounds").and_then(Value::as_object) else {
            result.push(
                ValidationIssue::warning(
                    IssueCode::ThemeNotFound,
                    "Theme defines no backgrounds palette",
                )
                .with_file(&self.theme_path),
            );
            return None;
        };

        let mut palette = BTreeSet::new();
        for (name, definition) in backgrounds {
            if !is_valid_definition(definition) {
                result.push(
                    ValidationIssue::error(
                        IssueCode::InvalidBackgroundDefinition,
                        format!("Background '{name}' has no usable value"),
                    )
                    .with_file(&self.theme_path)
                    .with_suggestion(format!(
                        "Use a CSS string or a mapping with one of: {}",
                        DEFINITION_KEYS.join(", ")
                    )),
                );
            }
            palette.insert(name.clone());
        }
        Some(palette)
    }
}

impl Validator for BackgroundsValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "backgrounds",
            description: "Checks background references against the theme palette",
            category: ValidatorCategory::Components,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Fast,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());
        let Some(palette) = self.load_palette(&mut result) else {
            return Ok(result.finish());
        };

        let mut usage: BTreeMap<&str, usize> = palette.iter().map(|n| (n.as_str(), 0)).collect();
        let mut references = 0_usize;

        for file in &context.content_files {
            for found in collect_strings_for_keys(&file.data, BACKGROUND_KEYS) {
                references += 1;
                let name = found.value.trim();
                if let Some(count) = usage.get_mut(name) {
                    *count += 1;
                } else if !is_inline_css(name) {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::UnknownBackground,
                            format!("{}: background '{name}' is not in the theme palette", found.json_path),
                        )
                        .with_file(&file.file_path)
                        .with_suggestion(format!(
                            "Known backgrounds: {}",
                            palette.iter().cloned().collect::<Vec<_>>().join(", ")
                        )),
                    );
                }
            }
        }

        for (name, count) in &usage {
            if *count == 0 {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::UnusedBackground,
                        format!("Background '{name}' is never used"),
                    )
                    .with_file(&self.theme_path),
                );
            }
        }

        result.artifact("paletteSize", palette.len());
        result.artifact("references", references);
        Ok(result.finish())
    }
}
