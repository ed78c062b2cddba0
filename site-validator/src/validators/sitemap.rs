//! Sitemap consistency.
//!
//! Without an explicit sitemap source the entries are derived from content:
//! one per base, indexable file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use site_content::{canonical_url, normalize_url};

use super::url_path;
use crate::context::{SitemapEntry, ValidationContext};
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct SitemapValidator;

/// Sitemap entry with the file it came from, when derived.
struct Candidate {
    loc: String,
    file: Option<PathBuf>,
}

fn derive_entries(context: &ValidationContext) -> Vec<Candidate> {
    context
        .base_files()
        .filter(|f| !f.is_noindex())
        .map(|f| Candidate {
            loc: normalize_url(&canonical_url(f)),
            file: Some(f.file_path.clone()),
        })
        .collect()
}

fn explicit_entries(entries: &[SitemapEntry]) -> Vec<Candidate> {
    entries
        .iter()
        .map(|e| Candidate {
            loc: normalize_url(url_path(&e.loc)),
            file: None,
        })
        .collect()
}

fn with_optional_file(issue: ValidationIssue, file: Option<&PathBuf>) -> ValidationIssue {
    match file {
        Some(path) => issue.with_file(path),
        None => issue,
    }
}

impl Validator for SitemapValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "sitemap",
            description: "Checks sitemap URLs against content, redirects and declared canonical URLs",
            category: ValidatorCategory::Seo,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Fast,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());
        let explicit = !context.sitemap_entries.is_empty();
        let candidates = if explicit {
            explicit_entries(&context.sitemap_entries)
        } else {
            derive_entries(context)
        };

        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for candidate in &candidates {
            let loc = candidate.loc.as_str();
            let file = candidate.file.as_ref();

            let count = seen.entry(loc).or_default();
            *count += 1;
            if *count == 2 {
                result.push(with_optional_file(
                    ValidationIssue::error(
                        IssueCode::DuplicateSitemapUrl,
                        format!("{loc} appears more than once in the sitemap"),
                    ),
                    file,
                ));
            }

            if explicit && !context.valid_urls.contains(loc) {
                result.push(
                    ValidationIssue::error(
                        IssueCode::SitemapUrlNotFound,
                        format!("Sitemap entry {loc} does not match any page"),
                    )
                    .with_suggestion("Remove the entry or create the page"),
                );
            }

            if let Some(redirect) = context.redirect_map.get(loc) {
                result.push(with_optional_file(
                    ValidationIssue::error(
                        IssueCode::RedirectedUrlInSitemap,
                        format!(
                            "Sitemap entry {loc} is redirected to {} (declared in {})",
                            redirect.target,
                            redirect.file.display()
                        ),
                    )
                    .with_suggestion("List the redirect target instead"),
                    file,
                ));
            }
        }

        for file in context.base_files().filter(|f| !f.is_noindex()) {
            let Some(declared) = file.meta.as_ref().and_then(|m| m.canonical_url.as_deref()) else {
                continue;
            };
            if declared.trim().is_empty() {
                continue;
            }
            let expected = normalize_url(&canonical_url(file));
            let declared_path = normalize_url(url_path(declared));
            if declared_path != expected {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::CanonicalMismatch,
                        format!(
                            "meta.canonical_url {declared} does not match the page URL {expected}"
                        ),
                    )
                    .with_file(&file.file_path)
                    .with_suggestion(format!("Set meta.canonical_url to {expected}")),
                );
            }
        }

        result.artifact("sitemapEntries", candidates.len());
        result.artifact("source", if explicit { "explicit" } else { "derived" });
        Ok(result.finish())
    }
}
