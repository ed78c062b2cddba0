//! Orchestration: build the context once, run validators in registry order,
//! isolate their failures and aggregate the results.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use crate::config::SiteConfig;
use crate::context::{ContextBuilder, ValidationContext};
use crate::issue::IssueCode;
use crate::registry::{Validator, ValidatorMetadata, default_validators};
use crate::report::{ValidationRunResult, ValidatorResult};

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Validator names to run, in the order given. `None` or empty runs all.
    pub validators: Option<Vec<String>>,
    /// Keep per-validator artifacts in the results.
    pub include_artifacts: bool,
}

/// Runs a set of validators over a cached [`ValidationContext`].
pub struct ValidationService {
    config: SiteConfig,
    validators: Vec<Box<dyn Validator>>,
    context: Option<ValidationContext>,
}

impl std::fmt::Debug for ValidationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationService")
            .field("config", &self.config)
            .field("validators", &self.validators.len())
            .field("context_built", &self.context.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl ValidationService {
    #[must_use]
    pub fn new(config: SiteConfig, validators: Vec<Box<dyn Validator>>) -> Self {
        Self {
            config,
            validators,
            context: None,
        }
    }

    /// A service over the built-in validator set.
    #[must_use]
    pub fn with_default_validators(config: SiteConfig) -> Self {
        let validators = default_validators(&config);
        Self::new(config, validators)
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Rebuild the context from disk, replacing any cached one.
    pub fn build_context(&mut self) -> &ValidationContext {
        self.context
            .insert(ContextBuilder::new(&self.config).build())
    }

    /// The cached context, building it on first use.
    pub fn context(&mut self) -> &ValidationContext {
        if self.context.is_none() {
            self.build_context();
        }
        self.context.get_or_insert_with(ValidationContext::default)
    }

    /// Replace the cached context, e.g. with one built in memory.
    pub fn set_context(&mut self, context: ValidationContext) {
        self.context = Some(context);
    }

    /// Drop the cached context so the next run reloads content.
    pub fn clear_context(&mut self) {
        self.context = None;
    }

    /// Metadata of every registered validator, in registry order.
    #[must_use]
    pub fn validator_metadata(&self) -> Vec<ValidatorMetadata> {
        self.validators.iter().map(|v| v.metadata()).collect()
    }

    /// Run the selected validators and aggregate their results.
    ///
    /// Never fails: unknown names, validator errors and validator panics all
    /// become failed results in the run.
    pub fn run_validators(&mut self, options: &RunOptions) -> ValidationRunResult {
        if self.context.is_none() {
            self.build_context();
        }
        let Self {
            validators,
            context,
            ..
        } = self;
        let validators: &[Box<dyn Validator>] = validators;
        let context = &*context.get_or_insert_with(ValidationContext::default);

        let selected: Vec<&str> = match &options.validators {
            Some(names) if !names.is_empty() => names.iter().map(String::as_str).collect(),
            _ => validators.iter().map(|v| v.metadata().name).collect(),
        };

        let results = selected
            .into_iter()
            .map(|name| {
                let mut result = match find(validators, name) {
                    Some(validator) => run_isolated(validator, context),
                    None => unknown_validator(validators, name),
                };
                if !options.include_artifacts {
                    result.strip_artifacts();
                }
                result
            })
            .collect();
        ValidationRunResult::from_results(results)
    }

    /// Run one validator by name.
    pub fn run_single_validator(&mut self, name: &str, include_artifacts: bool) -> ValidatorResult {
        let options = RunOptions {
            validators: Some(vec![name.to_owned()]),
            include_artifacts,
        };
        self.run_validators(&options)
            .validators
            .pop()
            .unwrap_or_else(|| unknown_validator(&self.validators, name))
    }
}

fn find<'a>(validators: &'a [Box<dyn Validator>], name: &str) -> Option<&'a dyn Validator> {
    validators
        .iter()
        .find(|v| v.metadata().name == name)
        .map(AsRef::as_ref)
}

fn unknown_validator(validators: &[Box<dyn Validator>], name: &str) -> ValidatorResult {
    let available = validators
        .iter()
        .map(|v| v.metadata().name)
        .collect::<Vec<_>>()
        .join(", ");
    tracing::warn!(validator = %name, "unknown validator requested");
    ValidatorResult::single_error(
        name,
        "Unknown validator",
        IssueCode::UnknownValidator,
        format!("Unknown validator '{name}'. Available: {available}"),
        Duration::ZERO,
    )
}

/// Run one validator, converting an `Err` or a panic into a failed result.
fn run_isolated(validator: &dyn Validator, context: &ValidationContext) -> ValidatorResult {
    let metadata = validator.metadata();
    let started = Instant::now();
    tracing::debug!(validator = metadata.name, "running validator");

    let outcome = catch_unwind(AssertUnwindSafe(|| validator.run(context)));
    let message = match outcome {
        Ok(Ok(result)) => {
            tracing::debug!(
                validator = metadata.name,
                errors = result.errors().len(),
                warnings = result.warnings().len(),
                "validator finished"
            );
            return result;
        }
        Ok(Err(e)) => format!("Validator '{}' failed: {e:#}", metadata.name),
        Err(payload) => format!(
            "Validator '{}' panicked: {}",
            metadata.name,
            panic_message(payload.as_ref())
        ),
    };

    tracing::error!(validator = metadata.name, "{message}");
    ValidatorResult::single_error(
        metadata.name,
        metadata.description,
        IssueCode::ValidatorError,
        message,
        started.elapsed(),
    )
}
