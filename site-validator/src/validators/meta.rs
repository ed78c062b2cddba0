//! Per-file `meta` block checks.

use site_content::ContentFile;

use crate::context::ValidationContext;
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

/// Allowed sitemap change frequencies.
pub const CHANGE_FREQUENCIES: &[&str] = &[
    "always", "hourly", "daily", "weekly", "monthly", "yearly", "never",
];

/// Recognized `robots` directives. Parameterized ones are matched by the part
/// before `:`.
pub const ROBOTS_DIRECTIVES: &[&str] = &[
    "all",
    "index",
    "noindex",
    "follow",
    "nofollow",
    "none",
    "noarchive",
    "nosnippet",
    "noimageindex",
    "notranslate",
    "nocache",
    "indexifembedded",
    "max-snippet",
    "max-image-preview",
    "max-video-preview",
    "unavailable_after",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct MetaValidator;

impl MetaValidator {
    fn check_file(file: &ContentFile, result: &mut ResultBuilder) {
        let Some(meta) = &file.meta else {
            result.push(
                ValidationIssue::warning(
                    IssueCode::MissingMeta,
                    format!("{} has no meta block", file.label()),
                )
                .with_file(&file.file_path)
                .with_suggestion("Add meta.page_title and meta.description"),
            );
            return;
        };

        if file.page_title().is_none() {
            result.push(
                ValidationIssue::warning(
                    IssueCode::MissingPageTitle,
                    format!("{} is missing meta.page_title", file.label()),
                )
                .with_file(&file.file_path),
            );
        }
        if file.meta_description().is_none() {
            result.push(
                ValidationIssue::warning(
                    IssueCode::MissingDescription,
                    format!("{} is missing meta.description", file.label()),
                )
                .with_file(&file.file_path),
            );
        }

        if let Some(priority) = &meta.priority {
            let problem = match priority.value() {
                Some(value) if (0.0..=1.0).contains(&value) => None,
                Some(_) => Some("is outside [0, 1]"),
                None => Some("is not a number"),
            };
            if let Some(problem) = problem {
                result.push(
                    ValidationIssue::error(
                        IssueCode::InvalidPriority,
                        format!("meta.priority {priority} {problem}"),
                    )
                    .with_file(&file.file_path)
                    .with_suggestion("Use a value between 0.0 and 1.0"),
                );
            }
        }

        if let Some(freq) = meta.change_frequency.as_deref()
            && !CHANGE_FREQUENCIES.contains(&freq.trim())
        {
            result.push(
                ValidationIssue::error(
                    IssueCode::InvalidChangeFrequency,
                    format!("meta.change_frequency '{freq}' is not a valid value"),
                )
                .with_file(&file.file_path)
                .with_suggestion(format!("Use one of: {}", CHANGE_FREQUENCIES.join(", "))),
            );
        }

        if let Some(robots) = meta.robots.as_deref() {
            for token in robots.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                let directive = token.split(':').next().unwrap_or(token).trim();
                if !ROBOTS_DIRECTIVES.contains(&directive.to_ascii_lowercase().as_str()) {
                    result.push(
                        ValidationIssue::warning(
                            IssueCode::UnknownRobotsDirective,
                            format!("Unrecognized robots directive '{token}'"),
                        )
                        .with_file(&file.file_path),
                    );
                }
            }
        }
    }
}

impl Validator for MetaValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "meta",
            description: "Checks page titles, descriptions, sitemap priority, change frequency and robots",
            category: ValidatorCategory::Seo,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Fast,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());
        for file in &context.content_files {
            Self::check_file(file, &mut result);
        }
        result.artifact("filesChecked", context.content_files.len());
        Ok(result.finish())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::validators::test_support::{content_file, context, with_meta};
    use site_content::{ContentMeta, ContentType, Priority};

    fn full_meta() -> ContentMeta {
        ContentMeta {
            page_title: Some("Web Development Bootcamp".to_owned()),
            description: Some("Learn to build for the web.".to_owned()),
            ..ContentMeta::default()
        }
    }

    fn run_with(meta: Option<ContentMeta>) -> ValidatorResult {
        let file = content_file(ContentType::Program, "web", "en");
        let file = match meta {
            Some(m) => with_meta(file, m),
            None => file,
        };
        MetaValidator.run(&context(vec![file])).unwrap()
    }

    #[test]
    fn test_complete_meta_passes() {
        let result = run_with(Some(full_meta()));
        assert!(result.errors().is_empty() && result.warnings().is_empty());
    }

    #[test]
    fn test_missing_meta_is_warning() {
        let result = run_with(None);
        assert!(result.errors().is_empty());
        assert!(result.has_code(IssueCode::MissingMeta));
    }

    #[test]
    fn test_priority_bounds_are_inclusive() {
        for (priority, fails) in [(0.0, false), (1.0, false), (0.5, false), (1.5, true), (-0.1, true)] {
            let meta = ContentMeta {
                priority: Some(priority.into()),
                ..full_meta()
            };
            let result = run_with(Some(meta));
            assert_eq!(
                result.errors().len(),
                usize::from(fails),
                "priority {priority}"
            );
            assert_eq!(
                result.has_code(IssueCode::InvalidPriority),
                fails,
                "priority {priority}"
            );
        }
    }

    #[test]
    fn test_quoted_and_non_numeric_priority() {
        let quoted = run_with(Some(ContentMeta {
            priority: Some(Priority::Text("0.8".to_owned())),
            ..full_meta()
        }));
        assert!(quoted.errors().is_empty());

        let text = run_with(Some(ContentMeta {
            priority: Some(Priority::Text("high".to_owned())),
            ..full_meta()
        }));
        assert_eq!(text.errors().len(), 1);
        assert!(text.has_code(IssueCode::InvalidPriority));
        assert!(text.errors()[0].message.contains("'high' is not a number"));
    }

    #[test]
    fn test_change_frequency_enum() {
        let ok = run_with(Some(ContentMeta {
            change_frequency: Some("weekly".to_owned()),
            ..full_meta()
        }));
        assert!(ok.errors().is_empty());
        let bad = run_with(Some(ContentMeta {
            change_frequency: Some("fortnightly".to_owned()),
            ..full_meta()
        }));
        assert!(bad.has_code(IssueCode::InvalidChangeFrequency));
    }

    #[test]
    fn test_robots_tokens() {
        let result = run_with(Some(ContentMeta {
            robots: Some("noindex, Follow, max-snippet:50, nofolow".to_owned()),
            ..full_meta()
        }));
        assert_eq!(result.warnings().len(), 1);
        assert!(result.warnings()[0].message.contains("nofolow"));
    }
}
