//! Report rendering for the CLI.
//!
//! JSON goes to stdout untouched by logging; the human format mirrors the
//! banner layout CI logs have always shown.

use std::io::Write;

use serde::Serialize;

use crate::registry::{ValidatorCategory, ValidatorMetadata};
use crate::report::{ValidationRunResult, ValidatorResult, ValidatorStatus};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEnvelope<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<&'a str>,
    #[serde(flatten)]
    result: &'a ValidationRunResult,
}

/// Write a run as pretty JSON, optionally stamped with `timestamp`.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(
    result: &ValidationRunResult,
    writer: &mut dyn Write,
    timestamp: Option<&str>,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&JsonEnvelope { timestamp, result })?;
    writeln!(writer, "{json}")?;
    Ok(())
}

fn status_mark(status: ValidatorStatus) -> &'static str {
    match status {
        ValidatorStatus::Passed => "\u{2713}",
        ValidatorStatus::Warning => "!",
        ValidatorStatus::Failed => "\u{2717}",
    }
}

fn write_validator(writer: &mut dyn Write, result: &ValidatorResult) -> anyhow::Result<()> {
    writeln!(
        writer,
        "{} {} ({} errors, {} warnings, {}ms)",
        status_mark(result.status()),
        result.name(),
        result.errors().len(),
        result.warnings().len(),
        result.duration()
    )?;
    for issue in result.errors().iter().chain(result.warnings()) {
        writeln!(writer, "{}", issue.format_human_readable())?;
    }
    if let Some(artifacts) = result.artifacts() {
        writeln!(writer, "    artifacts: {}", serde_json::to_string(artifacts)?)?;
    }
    Ok(())
}

/// Write a run as plain text.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(result: &ValidationRunResult, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  SITE CONTENT VALIDATION")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;

    for validator in &result.validators {
        writeln!(writer, "{}", "-".repeat(80))?;
        write_validator(writer, validator)?;
    }
    if !result.validators.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer)?;
    }

    let summary = &result.summary;
    writeln!(writer, "  Validators run: {}", summary.total)?;
    writeln!(writer, "  Passed:         {}", summary.passed)?;
    writeln!(writer, "  Warnings:       {}", summary.warnings)?;
    writeln!(writer, "  Failed:         {}", summary.failed)?;
    writeln!(writer, "  Duration:       {}ms", summary.duration)?;
    writeln!(writer)?;

    writeln!(writer, "{}", "=".repeat(80))?;
    if result.ok() {
        writeln!(writer, "\u{2713} All {} validator(s) passed", summary.total)?;
    } else {
        writeln!(
            writer,
            "\u{2717} {} of {} validator(s) failed",
            summary.failed, summary.total
        )?;
    }
    writeln!(writer, "{}", "=".repeat(80))?;
    Ok(())
}

/// Write validator metadata grouped by category, for `--list`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_validator_list(
    validators: &[ValidatorMetadata],
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    writeln!(writer, "Available validators:")?;
    for category in ValidatorCategory::ALL {
        let members: Vec<_> = validators.iter().filter(|v| v.category == category).collect();
        if members.is_empty() {
            continue;
        }
        writeln!(writer)?;
        writeln!(writer, "  {category}")?;
        for v in members {
            let scope = if v.api_exposed { "" } else { ", cli only" };
            writeln!(
                writer,
                "    {:<22} {} [{}{scope}]",
                v.name, v.description, v.estimated_duration
            )?;
        }
    }
    Ok(())
}
