//! Validator contract and the default registry.

use std::fmt;

use serde::Serialize;

use crate::config::SiteConfig;
use crate::context::ValidationContext;
use crate::report::ValidatorResult;
use crate::validators::{
    BackgroundsValidator, ComponentsValidator, ContentQualityValidator, FaqsValidator,
    ImagesValidator, MetaValidator, RedirectsValidator, SchemaCompletenessValidator,
    SchemaValidator, SeoValidator, SitemapValidator,
};

/// Grouping used by `--list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorCategory {
    Content,
    Seo,
    Integrity,
    Components,
}

impl ValidatorCategory {
    pub const ALL: [Self; 4] = [Self::Content, Self::Seo, Self::Integrity, Self::Components];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Seo => "seo",
            Self::Integrity => "integrity",
            Self::Components => "components",
        }
    }
}

impl fmt::Display for ValidatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory only; never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatedDuration {
    Fast,
    Medium,
    Slow,
}

impl fmt::Display for EstimatedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fast => "fast",
            Self::Medium => "medium",
            Self::Slow => "slow",
        })
    }
}

/// Static description of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub category: ValidatorCategory,
    pub api_exposed: bool,
    pub estimated_duration: EstimatedDuration,
}

/// A named, stateless check over a [`ValidationContext`].
///
/// Degraded inputs (absent registry, missing theme file) become warnings in
/// the returned result. An `Err` is reserved for genuinely unexpected
/// failures; the service turns it into a `VALIDATOR_ERROR` result.
pub trait Validator: Send + Sync {
    fn metadata(&self) -> ValidatorMetadata;

    /// Run the check.
    ///
    /// # Errors
    ///
    /// Returns an error only for unexpected failures.
    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult>;
}

/// The full validator set in registry (execution) order.
#[must_use]
pub fn default_validators(config: &SiteConfig) -> Vec<Box<dyn Validator>> {
    vec![
        Box::new(RedirectsValidator),
        Box::new(MetaValidator),
        Box::new(SchemaValidator),
        Box::new(SitemapValidator),
        Box::new(ComponentsValidator::new(
            config.resolve(&config.component_registry),
            config.max_file_size,
        )),
        Box::new(BackgroundsValidator::new(
            config.resolve(&config.theme),
            config.max_file_size,
        )),
        Box::new(FaqsValidator::new(
            config.resolve(&config.faq_dir),
            config.max_file_size,
        )),
        Box::new(SeoValidator),
        Box::new(SchemaCompletenessValidator::new(
            config.resolve(&config.faq_dir),
            config.max_file_size,
        )),
        Box::new(ImagesValidator::new(
            config.resolve(&config.image_registry),
            config.resolve(&config.public_dir),
            config.max_file_size,
        )),
        Box::new(ContentQualityValidator),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_default_registry_order_and_unique_names() {
        let validators = default_validators(&SiteConfig::default());
        let names: Vec<&str> = validators.iter().map(|v| v.metadata().name).collect();
        assert_eq!(
            names,
            vec![
                "redirects",
                "meta",
                "schema",
                "sitemap",
                "components",
                "backgrounds",
                "faqs",
                "seo",
                "schema-completeness",
                "images",
                "content-quality",
            ]
        );
        let unique: BTreeSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let validators = default_validators(&SiteConfig::default());
        let value = serde_json::to_value(validators[0].metadata()).unwrap();
        assert_eq!(value["name"], "redirects");
        assert_eq!(value["category"], "seo");
        assert!(value.get("apiExposed").is_some());
        assert!(value.get("estimatedDuration").is_some());
    }
}
