//! Validator and run result types.

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::issue::{IssueCode, IssueKind, ValidationIssue};
use crate::registry::ValidatorMetadata;

/// Outcome of one validator. Always derived from its issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorStatus {
    Passed,
    Warning,
    Failed,
}

impl ValidatorStatus {
    /// `Failed` iff any error, else `Warning` iff any warning, else `Passed`.
    #[must_use]
    pub fn derive(errors: &[ValidationIssue], warnings: &[ValidationIssue]) -> Self {
        if !errors.is_empty() {
            Self::Failed
        } else if !warnings.is_empty() {
            Self::Warning
        } else {
            Self::Passed
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Output of one validator.
///
/// Fields are private so `status` can never disagree with `errors`/`warnings`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorResult {
    name: String,
    description: String,
    status: ValidatorStatus,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    /// Wall-clock duration in milliseconds.
    duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifacts: Option<Map<String, Value>>,
}

impl ValidatorResult {
    /// Build a result, partitioning `issues` by kind.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        issues: Vec<ValidationIssue>,
        duration: Duration,
        artifacts: Option<Map<String, Value>>,
    ) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|issue| issue.kind == IssueKind::Error);
        let status = ValidatorStatus::derive(&errors, &warnings);
        Self {
            name: name.into(),
            description: description.into(),
            status,
            errors,
            warnings,
            duration: duration_ms(duration),
            artifacts,
        }
    }

    /// A failed result carrying exactly one error.
    #[must_use]
    pub fn single_error(
        name: impl Into<String>,
        description: impl Into<String>,
        code: IssueCode,
        message: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self::new(
            name,
            description,
            vec![ValidationIssue::error(code, message)],
            duration,
            None,
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn status(&self) -> ValidatorStatus {
        self.status
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationIssue] {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    /// Duration in milliseconds.
    #[must_use]
    pub fn duration(&self) -> u64 {
        self.duration
    }

    #[must_use]
    pub fn artifacts(&self) -> Option<&Map<String, Value>> {
        self.artifacts.as_ref()
    }

    /// Drop debug artifacts before the result leaves the service.
    pub fn strip_artifacts(&mut self) {
        self.artifacts = None;
    }

    /// Whether any issue carries `code`.
    #[must_use]
    pub fn has_code(&self, code: IssueCode) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|issue| issue.code == code)
    }
}

/// Collects issues and artifacts while a validator runs, timing it from
/// construction to [`ResultBuilder::finish`].
#[derive(Debug)]
pub struct ResultBuilder {
    name: &'static str,
    description: &'static str,
    started: Instant,
    issues: Vec<ValidationIssue>,
    artifacts: Map<String, Value>,
}

impl Extend<ValidationIssue> for ResultBuilder {
    fn extend<T: IntoIterator<Item = ValidationIssue>>(&mut self, iter: T) {
        self.issues.extend(iter);
    }
}

impl ResultBuilder {
    #[must_use]
    pub fn new(metadata: &ValidatorMetadata) -> Self {
        Self {
            name: metadata.name,
            description: metadata.description,
            started: Instant::now(),
            issues: Vec::new(),
            artifacts: Map::new(),
        }
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Record a debug counter or payload under `key`.
    pub fn artifact(&mut self, key: &str, value: impl Into<Value>) {
        self.artifacts.insert(key.to_owned(), value.into());
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.kind == IssueKind::Error)
            .count()
    }

    #[must_use]
    pub fn finish(self) -> ValidatorResult {
        let artifacts = (!self.artifacts.is_empty()).then_some(self.artifacts);
        ValidatorResult::new(
            self.name,
            self.description,
            self.issues,
            self.started.elapsed(),
            artifacts,
        )
    }
}

/// Aggregate counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    /// Sum of validator durations in milliseconds.
    pub duration: u64,
}

/// Result of a validation run.
///
/// CI pipelines check `summary.failed`; a non-zero count means at least one
/// validator reported an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRunResult {
    pub summary: RunSummary,
    pub validators: Vec<ValidatorResult>,
}

impl ValidationRunResult {
    /// Aggregate per-validator results. Every result lands in exactly one bucket.
    #[must_use]
    pub fn from_results(validators: Vec<ValidatorResult>) -> Self {
        let mut summary = RunSummary {
            total: validators.len(),
            ..RunSummary::default()
        };
        for result in &validators {
            match result.status() {
                ValidatorStatus::Passed => summary.passed += 1,
                ValidatorStatus::Warning => summary.warnings += 1,
                ValidatorStatus::Failed => summary.failed += 1,
            }
            summary.duration = summary.duration.saturating_add(result.duration());
        }
        Self {
            summary,
            validators,
        }
    }

    /// Whether the run should be treated as passing (exit code 0).
    #[must_use]
    pub fn ok(&self) -> bool {
        self.summary.failed == 0
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ValidatorResult> {
        self.validators.iter().find(|r| r.name() == name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn warning() -> ValidationIssue {
        ValidationIssue::warning(IssueCode::MissingDescription, "w")
    }

    fn error() -> ValidationIssue {
        ValidationIssue::error(IssueCode::InvalidPriority, "e")
    }

    fn result(issues: Vec<ValidationIssue>) -> ValidatorResult {
        ValidatorResult::new("meta", "desc", issues, Duration::from_millis(3), None)
    }

    #[test]
    fn test_status_derivation_covers_all_combinations() {
        assert_eq!(result(vec![]).status(), ValidatorStatus::Passed);
        assert_eq!(result(vec![warning()]).status(), ValidatorStatus::Warning);
        assert_eq!(result(vec![error()]).status(), ValidatorStatus::Failed);
        assert_eq!(
            result(vec![warning(), error()]).status(),
            ValidatorStatus::Failed
        );
    }

    #[test]
    fn test_issues_are_partitioned_by_kind() {
        let r = result(vec![warning(), error(), warning()]);
        assert_eq!(r.errors().len(), 1);
        assert_eq!(r.warnings().len(), 2);
        assert!(r.has_code(IssueCode::InvalidPriority));
    }

    #[test]
    fn test_summary_partitions_exactly() {
        let run = ValidationRunResult::from_results(vec![
            result(vec![]),
            result(vec![warning()]),
            result(vec![error()]),
            result(vec![error(), warning()]),
        ]);
        let s = run.summary;
        assert_eq!(s.total, run.validators.len());
        assert_eq!(s.passed + s.failed + s.warnings, s.total);
        assert_eq!((s.passed, s.warnings, s.failed), (1, 1, 2));
        assert_eq!(s.duration, 12);
        assert!(!run.ok());
    }

    #[test]
    fn test_artifacts_are_omitted_when_stripped() {
        let mut artifacts = Map::new();
        artifacts.insert("filesChecked".to_owned(), Value::from(4));
        let mut r = ValidatorResult::new("x", "y", vec![], Duration::ZERO, Some(artifacts));
        assert!(serde_json::to_value(&r).unwrap().get("artifacts").is_some());
        r.strip_artifacts();
        let value = serde_json::to_value(&r).unwrap();
        assert!(value.get("artifacts").is_none());
        assert_eq!(value["status"], "passed");
    }
}
