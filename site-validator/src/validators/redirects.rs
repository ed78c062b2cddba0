//! Redirect integrity.
//!
//! Each content file may list legacy paths under `meta.redirects`; each one
//! should redirect to the file's canonical URL. [`analyze_redirects`] is the
//! single source of truth for the redirect map: the context builder uses its
//! map and this validator reports its issues.

use std::collections::{BTreeMap, BTreeSet};

use site_content::{ContentFile, canonical_url, normalize_url};

use super::url_path;
use crate::context::{RedirectEntry, RedirectMap, ValidationContext};
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

/// Accepted redirects plus everything wrong with the declared ones.
#[derive(Debug, Clone, Default)]
pub struct RedirectAnalysis {
    pub redirect_map: RedirectMap,
    pub issues: Vec<ValidationIssue>,
}

/// Build the redirect map from `files` and check it against `valid_urls`.
///
/// When two files claim the same source, the first one seen wins and the
/// second is reported. A source equal to a live content URL is reported but
/// still kept, since the redirect would shadow that page at serve time.
#[must_use]
pub fn analyze_redirects(files: &[ContentFile], valid_urls: &BTreeSet<String>) -> RedirectAnalysis {
    let mut analysis = RedirectAnalysis::default();

    for file in files {
        let target = normalize_url(&canonical_url(file));
        let mut declared = BTreeSet::new();

        for raw in file.redirects() {
            if raw.trim().is_empty() {
                continue;
            }
            let source = normalize_url(url_path(raw));

            if !declared.insert(source.clone()) {
                analysis.issues.push(
                    ValidationIssue::warning(
                        IssueCode::DuplicateRedirect,
                        format!("Redirect '{source}' is listed more than once"),
                    )
                    .with_file(&file.file_path)
                    .with_suggestion("Remove the repeated entry from meta.redirects"),
                );
                continue;
            }

            if source == target {
                analysis.issues.push(
                    ValidationIssue::error(
                        IssueCode::SelfRedirect,
                        format!("Redirect '{raw}' points to the page's own URL {target}"),
                    )
                    .with_file(&file.file_path)
                    .with_suggestion("Remove the entry; a page cannot redirect to itself"),
                );
                continue;
            }

            if let Some(existing) = analysis.redirect_map.get(&source) {
                if existing.target == target {
                    // Variants of one page share a canonical URL.
                    tracing::debug!(source = %source, "redirect repeated by a sibling variant");
                    continue;
                }
                analysis.issues.push(
                    ValidationIssue::error(
                        IssueCode::RedirectConflict,
                        format!(
                            "Redirect '{source}' is claimed by both {} (-> {}) and {} (-> {target})",
                            existing.file.display(),
                            existing.target,
                            file.file_path.display()
                        ),
                    )
                    .with_file(&file.file_path)
                    .with_suggestion("Keep the redirect in only one content file"),
                );
                continue;
            }

            if valid_urls.contains(&source) {
                analysis.issues.push(
                    ValidationIssue::error(
                        IssueCode::RedirectOverwritesContent,
                        format!("Redirect '{source}' shadows an existing page at the same URL"),
                    )
                    .with_file(&file.file_path)
                    .with_suggestion("Remove the redirect or retire the page it overrides"),
                );
            }

            analysis.redirect_map.insert(
                source.clone(),
                RedirectEntry {
                    source,
                    target: target.clone(),
                    file: file.file_path.clone(),
                },
            );
        }
    }

    let looped = report_loops(&analysis.redirect_map, &mut analysis.issues);
    report_chains(&analysis.redirect_map, &looped, &mut analysis.issues);
    analysis
}

/// Walk the chain from every source; a revisited node closes a cycle.
/// Each cycle is reported once. Returns every source that sits on a cycle.
fn report_loops(map: &RedirectMap, issues: &mut Vec<ValidationIssue>) -> BTreeSet<String> {
    let mut reported: BTreeSet<Vec<&str>> = BTreeSet::new();
    let mut on_cycle = BTreeSet::new();

    for start in map.keys() {
        let mut visited: Vec<&str> = vec![start.as_str()];
        let mut current = start.as_str();
        while let Some(entry) = map.get(current) {
            let next = entry.target.as_str();
            if let Some(pos) = visited.iter().position(|seen| *seen == next) {
                let cycle = &visited[pos..];
                let mut key = cycle.to_vec();
                key.sort_unstable();
                if reported.insert(key) {
                    let route = cycle
                        .iter()
                        .chain(std::iter::once(&next))
                        .copied()
                        .collect::<Vec<_>>()
                        .join(" -> ");
                    let file = &map[cycle[0]].file;
                    issues.push(
                        ValidationIssue::error(
                            IssueCode::RedirectLoop,
                            format!("Redirect loop: {route}"),
                        )
                        .with_file(file)
                        .with_suggestion("Break the cycle by removing one of the redirects"),
                    );
                    on_cycle.extend(cycle.iter().map(|s| (*s).to_owned()));
                }
                break;
            }
            visited.push(next);
            current = next;
        }
    }
    on_cycle
}

fn report_chains(map: &RedirectMap, looped: &BTreeSet<String>, issues: &mut Vec<ValidationIssue>) {
    for entry in map.values() {
        if looped.contains(&entry.source) {
            continue;
        }
        if let Some(next) = map.get(&entry.target) {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::RedirectChain,
                    format!(
                        "Redirect '{}' -> {} is followed by another redirect -> {}",
                        entry.source, entry.target, next.target
                    ),
                )
                .with_file(&entry.file)
                .with_suggestion(format!("Point '{}' directly at {}", entry.source, next.target)),
            );
        }
    }
}

/// Reports redirect map issues (`redirects`).
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectsValidator;

impl Validator for RedirectsValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "redirects",
            description: "Checks meta.redirects for self-redirects, conflicts, shadowed pages and loops",
            category: ValidatorCategory::Seo,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Fast,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());
        let analysis = analyze_redirects(&context.content_files, &context.valid_urls);

        let mut per_file: BTreeMap<&std::path::Path, usize> = BTreeMap::new();
        for entry in analysis.redirect_map.values() {
            *per_file.entry(entry.file.as_path()).or_default() += 1;
        }
        result.artifact("totalRedirects", analysis.redirect_map.len());
        result.artifact("filesWithRedirects", per_file.len());

        for issue in analysis.issues {
            result.push(issue);
        }
        Ok(result.finish())
    }
}
