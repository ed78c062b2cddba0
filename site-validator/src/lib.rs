//! # site-validator
//!
//! Pluggable validation pipeline for YAML-driven site content.
//!
//! A [`ValidationService`] builds one read-only [`ValidationContext`] from the
//! content tree and runs named [`Validator`]s over it in registry order. Every
//! validator produces a [`ValidatorResult`]; a failing or panicking validator
//! becomes a failed result instead of aborting the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use site_validator::{RunOptions, SiteConfig, ValidationService};
//!
//! let config = SiteConfig::load(Path::new("."), None).unwrap();
//! let mut service = ValidationService::with_default_validators(config);
//! let run = service.run_validators(&RunOptions::default());
//! println!("{} validators, {} failed", run.summary.total, run.summary.failed);
//! for validator in &run.validators {
//!     for issue in validator.errors() {
//!         println!("{}", issue.format_human_readable());
//!     }
//! }
//! ```

pub mod config;
pub mod context;
pub mod issue;
pub mod output;
pub mod registry;
pub mod render;
pub mod report;
pub mod service;
pub mod validators;

pub use config::SiteConfig;
pub use context::{ContextBuilder, RedirectEntry, RedirectMap, SitemapEntry, ValidationContext};
pub use issue::{IssueCode, IssueKind, ValidationIssue};
pub use registry::{
    EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata, default_validators,
};
pub use render::{DefinitionRenderer, SchemaRenderer};
pub use report::{ResultBuilder, RunSummary, ValidationRunResult, ValidatorResult, ValidatorStatus};
pub use service::{RunOptions, ValidationService};
