//! FAQ sources and the sections that reference them.
//!
//! One source per locale (`{faq_dir}/{locale}.yml`) holds a `faqs` list of
//! `{id, question, answer, category, last_updated}` entries. FAQ sections
//! select entries by `faq_ids` or by `category`; a FAQ section with neither
//! (and no inline items) shows the whole locale source.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Months, NaiveDate};
use serde_json::Value;
use site_content::ContentFile;
use site_content::filename::{is_content_file_name, parse_file_name};
use site_content::walk::collect_sections;
use site_content::yaml::{parse_yaml, read_file_bounded};
use walkdir::WalkDir;

use super::{faq_category, faq_id, faq_ids, faq_source_entries, inline_faqs, is_faq_section};
use crate::context::ValidationContext;
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

/// Entries older than this are stale.
pub const STALE_AFTER_MONTHS: u32 = 6;

#[derive(Debug)]
struct FaqEntry {
    id: String,
    category: Option<String>,
    line: Option<usize>,
}

#[derive(Debug)]
struct FaqSource {
    path: PathBuf,
    entries: Vec<FaqEntry>,
}

/// What the content of one locale asks for.
#[derive(Debug, Default)]
struct LocaleReferences {
    ids: BTreeSet<String>,
    categories: BTreeSet<String>,
    shows_all: bool,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}

/// 1-based line of the `id:` entry carrying `id`.
fn line_of_id(text: &str, id: &str) -> Option<usize> {
    text.lines().position(|line| {
        let line = line.trim_start().trim_start_matches("- ").trim_start();
        line.strip_prefix("id:")
            .map(|v| v.trim().trim_matches(['"', '\'']))
            .is_some_and(|v| v == id)
    })
    .map(|idx| idx + 1)
}

/// Content and date checks for one FAQ entry.
fn check_entry(item: &Value, label: &str, cutoff: Option<NaiveDate>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for field in ["question", "answer"] {
        let blank = item
            .get(field)
            .and_then(Value::as_str)
            .is_none_or(|s| s.trim().is_empty());
        if blank {
            issues.push(ValidationIssue::error(
                IssueCode::EmptyFaq,
                format!("FAQ {label} has an empty {field}"),
            ));
        }
    }

    match item.get("last_updated") {
        None | Some(Value::Null) => issues.push(
            ValidationIssue::warning(
                IssueCode::MissingFaqDate,
                format!("FAQ {label} has no last_updated date"),
            )
            .with_suggestion("Add last_updated: YYYY-MM-DD"),
        ),
        Some(raw) => match raw.as_str().and_then(parse_date) {
            None => issues.push(ValidationIssue::error(
                IssueCode::InvalidFaqDate,
                format!("FAQ {label} has an unparseable last_updated {raw}"),
            )),
            Some(date) if cutoff.is_some_and(|c| date < c) => issues.push(
                ValidationIssue::warning(
                    IssueCode::StaleFaq,
                    format!(
                        "FAQ {label} was last updated {date}, more than {STALE_AFTER_MONTHS} months ago"
                    ),
                )
                .with_suggestion("Review the answer and bump last_updated"),
            ),
            Some(_) => {}
        },
    }
    issues
}

#[derive(Debug, Clone)]
pub struct FaqsValidator {
    faq_dir: PathBuf,
    max_file_size: u64,
    today: Option<NaiveDate>,
}

impl FaqsValidator {
    #[must_use]
    pub fn new(faq_dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            faq_dir: faq_dir.into(),
            max_file_size,
            today: None,
        }
    }

    /// Pin the date staleness is measured from.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn source_files(&self) -> Vec<(String, PathBuf)> {
        WalkDir::new(&self.faq_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let name = e.file_name().to_str()?.to_owned();
                if !is_content_file_name(&name) {
                    return None;
                }
                // Only bare `{locale}.yml` names are sources.
                let parts = parse_file_name(&name);
                let stem = name.split('.').next()?;
                (stem == parts.locale && parts.variant.is_none())
                    .then(|| (parts.locale, e.into_path()))
            })
            .collect()
    }

    fn load_source(
        &self,
        path: &Path,
        cutoff: Option<NaiveDate>,
        result: &mut ResultBuilder,
    ) -> Option<FaqSource> {
        let parsed = read_file_bounded(path, self.max_file_size)
            .and_then(|text| parse_yaml(&text, path).map(|value| (text, value)));
        let (text, value) = match parsed {
            Ok(ok) => ok,
            Err(e) => {
                result.push(
                    ValidationIssue::error(IssueCode::InvalidFaqSource, e.to_string())
                        .with_file(path),
                );
                return None;
            }
        };

        if value.is_null() {
            tracing::debug!(path = %path.display(), "empty FAQ source");
            return Some(FaqSource {
                path: path.to_path_buf(),
                entries: Vec::new(),
            });
        }
        let Some(items) = faq_source_entries(&value) else {
            result.push(
                ValidationIssue::error(IssueCode::InvalidFaqSource, "Expected a 'faqs' list")
                    .with_file(path),
            );
            return None;
        };

        let mut entries = Vec::new();
        let mut seen = BTreeSet::new();
        for (idx, item) in items.iter().enumerate() {
            let id = item.get("id").and_then(faq_id);
            let line = id.as_deref().and_then(|id| line_of_id(&text, id));
            let label = id.clone().unwrap_or_else(|| format!("#{}", idx + 1));
            let located = |issue: ValidationIssue| match line {
                Some(l) => issue.with_file(path).with_line(l),
                None => issue.with_file(path),
            };

            result.extend(check_entry(item, &label, cutoff).into_iter().map(&located));

            let Some(id) = id else {
                continue;
            };
            if !seen.insert(id.clone()) {
                result.push(located(ValidationIssue::error(
                    IssueCode::DuplicateFaqId,
                    format!("FAQ id '{id}' is used more than once"),
                )));
                continue;
            }
            entries.push(FaqEntry {
                id,
                category: item
                    .get("category")
                    .and_then(Value::as_str)
                    .map(|c| c.trim().to_owned()),
                line,
            });
        }

        Some(FaqSource {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn check_references(
        file: &ContentFile,
        source: Option<&FaqSource>,
        refs: &mut LocaleReferences,
        result: &mut ResultBuilder,
    ) {
        for (json_path, section) in collect_sections(&file.data) {
            if !is_faq_section(section) {
                continue;
            }
            let ids = faq_ids(section);
            let category = faq_category(section);
            let inline = inline_faqs(section).is_some();

            if ids.is_empty() && category.is_none() {
                if !inline {
                    refs.shows_all = true;
                }
                continue;
            }

            for id in ids {
                if !source.is_some_and(|s| s.entries.iter().any(|e| e.id == id)) {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::UnknownFaqReference,
                            format!("{json_path}: FAQ id '{id}' does not exist for locale '{}'", file.locale),
                        )
                        .with_file(&file.file_path),
                    );
                }
                refs.ids.insert(id);
            }

            if let Some(category) = category {
                let known = source.is_some_and(|s| {
                    s.entries
                        .iter()
                        .any(|e| e.category.as_deref() == Some(category))
                });
                if !known {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::UnknownFaqReference,
                            format!(
                                "{json_path}: FAQ category '{category}' has no entries for locale '{}'",
                                file.locale
                            ),
                        )
                        .with_file(&file.file_path),
                    );
                }
                refs.categories.insert(category.to_owned());
            }
        }
    }
}

impl Validator for FaqsValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "faqs",
            description: "Checks FAQ sources for integrity and freshness and FAQ sections for valid references",
            category: ValidatorCategory::Content,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Fast,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());

        if !self.faq_dir.is_dir() {
            result.push(
                ValidationIssue::warning(
                    IssueCode::FaqSourceNotFound,
                    format!("FAQ directory not found at {}", self.faq_dir.display()),
                )
                .with_suggestion("Set faq_dir in site-validator.yml"),
            );
            return Ok(result.finish());
        }

        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let cutoff = today.checked_sub_months(Months::new(STALE_AFTER_MONTHS));

        let mut sources: BTreeMap<String, FaqSource> = BTreeMap::new();
        for (locale, path) in self.source_files() {
            if let Some(source) = self.load_source(&path, cutoff, &mut result) {
                sources.insert(locale, source);
            }
        }
        if sources.is_empty() {
            result.push(
                ValidationIssue::warning(
                    IssueCode::FaqSourceNotFound,
                    format!("No FAQ sources found in {}", self.faq_dir.display()),
                )
                .with_suggestion("Add one file per locale, e.g. en.yml"),
            );
        }

        let mut references: BTreeMap<String, LocaleReferences> = BTreeMap::new();
        for file in &context.content_files {
            let refs = references.entry(file.locale.clone()).or_default();
            Self::check_references(file, sources.get(&file.locale), refs, &mut result);
        }

        let mut total = 0_usize;
        for (locale, source) in &sources {
            total += source.entries.len();
            let refs = references.get(locale);
            if refs.is_some_and(|r| r.shows_all) {
                continue;
            }
            for entry in &source.entries {
                let used = refs.is_some_and(|r| {
                    r.ids.contains(&entry.id)
                        || entry
                            .category
                            .as_ref()
                            .is_some_and(|c| r.categories.contains(c))
                });
                if !used {
                    let issue = ValidationIssue::warning(
                        IssueCode::OrphanedFaq,
                        format!("FAQ '{}' ({locale}) is not shown on any page", entry.id),
                    )
                    .with_file(&source.path);
                    result.push(match entry.line {
                        Some(line) => issue.with_line(line),
                        None => issue,
                    });
                }
            }
        }

        result.artifact("locales", sources.len());
        result.artifact("totalFaqs", total);
        Ok(result.finish())
    }
}
