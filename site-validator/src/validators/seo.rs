//! Search-appearance checks: lengths, social image, canonical URL and
//! duplicates across pages.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

use site_content::ContentFile;

use crate::context::ValidationContext;
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

/// Recommended page title length in characters.
pub const TITLE_LENGTH: RangeInclusive<usize> = 30..=60;
/// Recommended meta description length in characters.
pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 70..=160;

#[derive(Debug, Clone, Copy, Default)]
pub struct SeoValidator;

fn has_value(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn check_length(
    file: &ContentFile,
    field: &str,
    value: &str,
    range: &RangeInclusive<usize>,
    code: IssueCode,
) -> Option<ValidationIssue> {
    let len = value.chars().count();
    if range.contains(&len) {
        return None;
    }
    Some(
        ValidationIssue::warning(
            code,
            format!(
                "{field} is {len} characters; recommended {}-{}",
                range.start(),
                range.end()
            ),
        )
        .with_file(&file.file_path),
    )
}

/// One error per exact value shared by more than one file, naming every file.
fn report_duplicates(
    groups: BTreeMap<&str, Vec<&Path>>,
    field: &str,
    code: IssueCode,
    result: &mut ResultBuilder,
) {
    for (value, files) in groups {
        if files.len() < 2 {
            continue;
        }
        let listed = files
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        result.push(
            ValidationIssue::error(
                code,
                format!("{} files share the {field} \"{value}\": {listed}", files.len()),
            )
            .with_file(files[0])
            .with_suggestion(format!("Give each page a unique {field}")),
        );
    }
}

impl Validator for SeoValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "seo",
            description: "Checks title and description lengths, social images, canonical URLs and duplicates",
            category: ValidatorCategory::Seo,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Fast,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());
        let mut titles: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
        let mut descriptions: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();

        for file in context.base_files() {
            if let Some(title) = file.page_title() {
                result.extend(check_length(
                    file,
                    "meta.page_title",
                    title,
                    &TITLE_LENGTH,
                    IssueCode::TitleLength,
                ));
                titles.entry(title).or_default().push(&file.file_path);
            }
            if let Some(description) = file.meta_description() {
                result.extend(check_length(
                    file,
                    "meta.description",
                    description,
                    &DESCRIPTION_LENGTH,
                    IssueCode::DescriptionLength,
                ));
                descriptions
                    .entry(description)
                    .or_default()
                    .push(&file.file_path);
            }

            let meta = file.meta.as_ref();
            if !has_value(meta.and_then(|m| m.og_image.as_ref())) {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::MissingOgImage,
                        format!("{} has no meta.og_image", file.label()),
                    )
                    .with_file(&file.file_path),
                );
            }
            if !has_value(meta.and_then(|m| m.canonical_url.as_ref())) {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::MissingCanonicalUrl,
                        format!("{} has no meta.canonical_url", file.label()),
                    )
                    .with_file(&file.file_path),
                );
            }
        }

        report_duplicates(titles, "page title", IssueCode::DuplicateTitle, &mut result);
        report_duplicates(
            descriptions,
            "description",
            IssueCode::DuplicateDescription,
            &mut result,
        );
        Ok(result.finish())
    }
}
