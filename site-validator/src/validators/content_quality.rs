//! Structural sanity of every content file, internal links and
//! translation coverage.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use site_content::walk::{collect_sections, walk_entries, walk_strings};
use site_content::{ContentFile, ContentType, normalize_url};

use super::site_path;
use crate::context::ValidationContext;
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

/// Text fields that must never be present but empty.
pub const CRITICAL_FIELDS: &[&str] = &[
    "title",
    "heading",
    "description",
    "button_text",
    "cta_text",
    "question",
    "answer",
    "label",
];

/// Locales every translated page is expected to exist in.
pub const REQUIRED_LOCALES: &[&str] = &["en", "es"];

#[allow(clippy::expect_used)]
static EMBEDDED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\]\((/[^)\s]*)\)|href\s*=\s*["'](/[^"']*)["']"#).expect("valid regex")
});

/// Only localized routes and the root are owned by content.
fn is_checked_route(path: &str) -> bool {
    path == "/"
        || ["/en", "/es"]
            .iter()
            .any(|prefix| path == *prefix || path.starts_with(&format!("{prefix}/")))
}

/// Internal links inside one string: the whole value when it is a bare
/// path, plus markdown and HTML links embedded in prose.
fn links_in(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with('/') && !trimmed.contains(char::is_whitespace) {
        return vec![trimmed];
    }
    EMBEDDED_LINK
        .captures_iter(text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str())
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentQualityValidator;

fn check_structure(file: &ContentFile, result: &mut ResultBuilder) {
    if file.sections().is_none_or(Vec::is_empty) {
        result.push(
            ValidationIssue::error(
                IssueCode::MissingSections,
                format!("{} has no sections", file.label()),
            )
            .with_file(&file.file_path)
            .with_suggestion("Add a non-empty 'sections' list"),
        );
        return;
    }

    for (path, section) in collect_sections(&file.data) {
        let has_type = section
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| !t.trim().is_empty());
        if !has_type {
            result.push(
                ValidationIssue::error(
                    IssueCode::SectionMissingType,
                    format!("{path} has no 'type'"),
                )
                .with_file(&file.file_path),
            );
        }
    }
}

fn check_critical_fields(file: &ContentFile, result: &mut ResultBuilder) {
    walk_entries(&file.data, "$", &mut |path, key, value| {
        if CRITICAL_FIELDS.contains(&key) && value.as_str().is_some_and(|s| s.trim().is_empty()) {
            result.push(
                ValidationIssue::warning(
                    IssueCode::EmptyCriticalField,
                    format!("{path} is empty"),
                )
                .with_file(&file.file_path),
            );
        }
    });
}

fn check_links(file: &ContentFile, context: &ValidationContext, result: &mut ResultBuilder) {
    walk_strings(&file.data, "$", &mut |path, text| {
        for link in links_in(text) {
            let Some(local) = site_path(link) else {
                continue;
            };
            if !is_checked_route(local) {
                continue;
            }
            let normalized = normalize_url(local);
            if context.valid_urls.contains(&normalized) {
                continue;
            }
            let mut issue = ValidationIssue::error(
                IssueCode::BrokenInternalLink,
                format!("{path} links to {link}, which is not a known page"),
            )
            .with_file(&file.file_path);
            if let Some(entry) = context.redirect_map.get(&normalized) {
                issue = issue.with_suggestion(format!("Link to {} instead", entry.target));
            }
            result.push(issue);
        }
    });
}

fn check_translations(context: &ValidationContext, result: &mut ResultBuilder) {
    let mut groups: BTreeMap<(ContentType, &str), (BTreeSet<&str>, &ContentFile)> =
        BTreeMap::new();
    for file in context
        .base_files()
        .filter(|f| f.content_type != ContentType::Landing)
    {
        groups
            .entry((file.content_type, file.slug.as_str()))
            .or_insert_with(|| (BTreeSet::new(), file))
            .0
            .insert(file.locale.as_str());
    }

    for ((content_type, slug), (locales, first)) in groups {
        let missing: Vec<&str> = REQUIRED_LOCALES
            .iter()
            .copied()
            .filter(|l| !locales.contains(l))
            .collect();
        if missing.is_empty() {
            continue;
        }
        result.push(
            ValidationIssue::warning(
                IssueCode::MissingTranslation,
                format!(
                    "{content_type}/{slug} has no {} translation",
                    missing.join(", ")
                ),
            )
            .with_file(&first.file_path),
        );
    }
}

impl Validator for ContentQualityValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "content-quality",
            description: "Checks section structure, empty critical fields, internal links and translations",
            category: ValidatorCategory::Content,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Medium,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());
        for file in &context.content_files {
            check_structure(file, &mut result);
            check_critical_fields(file, &mut result);
            check_links(file, context, &mut result);
        }
        check_translations(context, &mut result);

        result.artifact("filesChecked", context.content_files.len());
        result.artifact("skippedFiles", context.skipped_files.len());
        Ok(result.finish())
    }
}
