//! Issue taxonomy shared by all validators.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

/// Severity of a finding. Errors fail a validator; warnings never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Error,
    Warning,
}

/// Stable machine-readable issue codes.
///
/// Serialized through [`IssueCode::as_str`] as `SCREAMING_SNAKE_CASE`
/// (`MissingPageTitle` -> `MISSING_PAGE_TITLE`). Consumers match on these
/// strings, so variants are never renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum IssueCode {
    // Service
    UnknownValidator,
    ValidatorError,

    // redirects
    SelfRedirect,
    RedirectConflict,
    RedirectOverwritesContent,
    RedirectLoop,
    DuplicateRedirect,
    RedirectChain,

    // meta
    MissingMeta,
    MissingPageTitle,
    MissingDescription,
    InvalidPriority,
    InvalidChangeFrequency,
    UnknownRobotsDirective,

    // schema
    InvalidSchemaRef,
    InvalidSchemaOverride,
    EmptySchemaInclude,

    // sitemap
    SitemapUrlNotFound,
    RedirectedUrlInSitemap,
    DuplicateSitemapUrl,
    CanonicalMismatch,

    // components
    ComponentRegistryNotFound,
    MissingComponentSchema,
    InvalidComponentSchema,
    MissingComponentExamples,
    InvalidComponentExample,
    UnregisteredComponent,
    UnknownComponentVersion,
    UnknownComponentVariant,
    OrphanedComponent,

    // backgrounds
    ThemeNotFound,
    InvalidBackgroundDefinition,
    UnknownBackground,
    UnusedBackground,
    InvalidThemeSource,

    // faqs
    FaqSourceNotFound,
    EmptyFaq,
    DuplicateFaqId,
    MissingFaqDate,
    InvalidFaqDate,
    StaleFaq,
    UnknownFaqReference,
    OrphanedFaq,
    InvalidFaqSource,

    // seo
    TitleLength,
    DescriptionLength,
    MissingOgImage,
    MissingCanonicalUrl,
    DuplicateTitle,
    DuplicateDescription,

    // schema-completeness
    EmptySchemaOutput,
    SchemaRenderError,
    InvalidJsonLd,
    SchemaPlaceholder,
    MissingFaqSchema,

    // images
    ImageRegistryNotFound,
    MissingImageSrc,
    MissingAltText,
    ImageFileNotFound,
    UnknownImageId,
    OrphanedImage,
    InvalidImageRegistry,

    // content-quality
    MissingSections,
    SectionMissingType,
    EmptyCriticalField,
    BrokenInternalLink,
    MissingTranslation,
}

impl IssueCode {
    /// The serialized form of the code. This match is the only place the
    /// strings are spelled out.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownValidator => "UNKNOWN_VALIDATOR",
            Self::ValidatorError => "VALIDATOR_ERROR",
            Self::SelfRedirect => "SELF_REDIRECT",
            Self::RedirectConflict => "REDIRECT_CONFLICT",
            Self::RedirectOverwritesContent => "REDIRECT_OVERWRITES_CONTENT",
            Self::RedirectLoop => "REDIRECT_LOOP",
            Self::DuplicateRedirect => "DUPLICATE_REDIRECT",
            Self::RedirectChain => "REDIRECT_CHAIN",
            Self::MissingMeta => "MISSING_META",
            Self::MissingPageTitle => "MISSING_PAGE_TITLE",
            Self::MissingDescription => "MISSING_DESCRIPTION",
            Self::InvalidPriority => "INVALID_PRIORITY",
            Self::InvalidChangeFrequency => "INVALID_CHANGE_FREQUENCY",
            Self::UnknownRobotsDirective => "UNKNOWN_ROBOTS_DIRECTIVE",
            Self::InvalidSchemaRef => "INVALID_SCHEMA_REF",
            Self::InvalidSchemaOverride => "INVALID_SCHEMA_OVERRIDE",
            Self::EmptySchemaInclude => "EMPTY_SCHEMA_INCLUDE",
            Self::SitemapUrlNotFound => "SITEMAP_URL_NOT_FOUND",
            Self::RedirectedUrlInSitemap => "REDIRECTED_URL_IN_SITEMAP",
            Self::DuplicateSitemapUrl => "DUPLICATE_SITEMAP_URL",
            Self::CanonicalMismatch => "CANONICAL_MISMATCH",
            Self::ComponentRegistryNotFound => "COMPONENT_REGISTRY_NOT_FOUND",
            Self::MissingComponentSchema => "MISSING_COMPONENT_SCHEMA",
            Self::InvalidComponentSchema => "INVALID_COMPONENT_SCHEMA",
            Self::MissingComponentExamples => "MISSING_COMPONENT_EXAMPLES",
            Self::InvalidComponentExample => "INVALID_COMPONENT_EXAMPLE",
            Self::UnregisteredComponent => "UNREGISTERED_COMPONENT",
            Self::UnknownComponentVersion => "UNKNOWN_COMPONENT_VERSION",
            Self::UnknownComponentVariant => "UNKNOWN_COMPONENT_VARIANT",
            Self::OrphanedComponent => "ORPHANED_COMPONENT",
            Self::ThemeNotFound => "THEME_NOT_FOUND",
            Self::InvalidBackgroundDefinition => "INVALID_BACKGROUND_DEFINITION",
            Self::UnknownBackground => "UNKNOWN_BACKGROUND",
            Self::UnusedBackground => "UNUSED_BACKGROUND",
            Self::InvalidThemeSource => "INVALID_THEME_SOURCE",
            Self::FaqSourceNotFound => "FAQ_SOURCE_NOT_FOUND",
            Self::EmptyFaq => "EMPTY_FAQ",
            Self::DuplicateFaqId => "DUPLICATE_FAQ_ID",
            Self::MissingFaqDate => "MISSING_FAQ_DATE",
            Self::InvalidFaqDate => "INVALID_FAQ_DATE",
            Self::StaleFaq => "STALE_FAQ",
            Self::UnknownFaqReference => "UNKNOWN_FAQ_REFERENCE",
            Self::OrphanedFaq => "ORPHANED_FAQ",
            Self::InvalidFaqSource => "INVALID_FAQ_SOURCE",
            Self::TitleLength => "TITLE_LENGTH",
            Self::DescriptionLength => "DESCRIPTION_LENGTH",
            Self::MissingOgImage => "MISSING_OG_IMAGE",
            Self::MissingCanonicalUrl => "MISSING_CANONICAL_URL",
            Self::DuplicateTitle => "DUPLICATE_TITLE",
            Self::DuplicateDescription => "DUPLICATE_DESCRIPTION",
            Self::EmptySchemaOutput => "EMPTY_SCHEMA_OUTPUT",
            Self::SchemaRenderError => "SCHEMA_RENDER_ERROR",
            Self::InvalidJsonLd => "INVALID_JSON_LD",
            Self::SchemaPlaceholder => "SCHEMA_PLACEHOLDER",
            Self::MissingFaqSchema => "MISSING_FAQ_SCHEMA",
            Self::ImageRegistryNotFound => "IMAGE_REGISTRY_NOT_FOUND",
            Self::MissingImageSrc => "MISSING_IMAGE_SRC",
            Self::MissingAltText => "MISSING_ALT_TEXT",
            Self::ImageFileNotFound => "IMAGE_FILE_NOT_FOUND",
            Self::UnknownImageId => "UNKNOWN_IMAGE_ID",
            Self::OrphanedImage => "ORPHANED_IMAGE",
            Self::InvalidImageRegistry => "INVALID_IMAGE_REGISTRY",
            Self::MissingSections => "MISSING_SECTIONS",
            Self::SectionMissingType => "SECTION_MISSING_TYPE",
            Self::EmptyCriticalField => "EMPTY_CRITICAL_FIELD",
            Self::BrokenInternalLink => "BROKEN_INTERNAL_LINK",
            Self::MissingTranslation => "MISSING_TRANSLATION",
        }
    }
}

impl Serialize for IssueCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding produced by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub code: IssueCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    #[must_use]
    pub fn new(kind: IssueKind, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            file: None,
            line: None,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(IssueKind::Error, code, message)
    }

    #[must_use]
    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(IssueKind::Warning, code, message)
    }

    #[must_use]
    pub fn with_file(mut self, file: impl AsRef<Path>) -> Self {
        self.file = Some(file.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Format the issue for human-readable output.
    ///
    /// `{file}:{line}: [{code}] {message}`, omitting whatever location is absent.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        let location = match (&self.file, self.line) {
            (Some(file), Some(line)) => format!("{}:{line}: ", file.display()),
            (Some(file), None) => format!("{}: ", file.display()),
            (None, _) => String::new(),
        };
        format!("{location}[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EVERY_CODE: &[IssueCode] = &[
        IssueCode::UnknownValidator,
        IssueCode::ValidatorError,
        IssueCode::SelfRedirect,
        IssueCode::RedirectConflict,
        IssueCode::RedirectOverwritesContent,
        IssueCode::RedirectLoop,
        IssueCode::DuplicateRedirect,
        IssueCode::RedirectChain,
        IssueCode::MissingMeta,
        IssueCode::MissingPageTitle,
        IssueCode::MissingDescription,
        IssueCode::InvalidPriority,
        IssueCode::InvalidChangeFrequency,
        IssueCode::UnknownRobotsDirective,
        IssueCode::InvalidSchemaRef,
        IssueCode::InvalidSchemaOverride,
        IssueCode::EmptySchemaInclude,
        IssueCode::SitemapUrlNotFound,
        IssueCode::RedirectedUrlInSitemap,
        IssueCode::DuplicateSitemapUrl,
        IssueCode::CanonicalMismatch,
        IssueCode::ComponentRegistryNotFound,
        IssueCode::MissingComponentSchema,
        IssueCode::InvalidComponentSchema,
        IssueCode::MissingComponentExamples,
        IssueCode::InvalidComponentExample,
        IssueCode::UnregisteredComponent,
        IssueCode::UnknownComponentVersion,
        IssueCode::UnknownComponentVariant,
        IssueCode::OrphanedComponent,
        IssueCode::ThemeNotFound,
        IssueCode::InvalidBackgroundDefinition,
        IssueCode::UnknownBackground,
        IssueCode::UnusedBackground,
        IssueCode::InvalidThemeSource,
        IssueCode::FaqSourceNotFound,
        IssueCode::EmptyFaq,
        IssueCode::DuplicateFaqId,
        IssueCode::MissingFaqDate,
        IssueCode::InvalidFaqDate,
        IssueCode::StaleFaq,
        IssueCode::UnknownFaqReference,
        IssueCode::OrphanedFaq,
        IssueCode::InvalidFaqSource,
        IssueCode::TitleLength,
        IssueCode::DescriptionLength,
        IssueCode::MissingOgImage,
        IssueCode::MissingCanonicalUrl,
        IssueCode::DuplicateTitle,
        IssueCode::DuplicateDescription,
        IssueCode::EmptySchemaOutput,
        IssueCode::SchemaRenderError,
        IssueCode::InvalidJsonLd,
        IssueCode::SchemaPlaceholder,
        IssueCode::MissingFaqSchema,
        IssueCode::ImageRegistryNotFound,
        IssueCode::MissingImageSrc,
        IssueCode::MissingAltText,
        IssueCode::ImageFileNotFound,
        IssueCode::UnknownImageId,
        IssueCode::OrphanedImage,
        IssueCode::InvalidImageRegistry,
        IssueCode::MissingSections,
        IssueCode::SectionMissingType,
        IssueCode::EmptyCriticalField,
        IssueCode::BrokenInternalLink,
        IssueCode::MissingTranslation,
    ];

    fn screaming_snake(name: &str) -> String {
        let mut out = String::new();
        for (idx, c) in name.chars().enumerate() {
            if c.is_ascii_uppercase() && idx > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_uppercase());
        }
        out
    }

    #[test]
    fn test_every_code_is_screaming_snake_of_its_name() {
        let mut seen = std::collections::BTreeSet::new();
        for code in EVERY_CODE {
            let expected = screaming_snake(&format!("{code:?}"));
            assert_eq!(code.as_str(), expected);
            assert_eq!(serde_json::to_value(code).unwrap(), expected);
            assert!(seen.insert(code.as_str()), "duplicate code {code}");
        }
    }

    #[test]
    fn test_code_serializes_screaming_snake_case() {
        assert_eq!(IssueCode::MissingPageTitle.as_str(), "MISSING_PAGE_TITLE");
        assert_eq!(IssueCode::InvalidJsonLd.as_str(), "INVALID_JSON_LD");
        assert_eq!(IssueCode::UnknownValidator.to_string(), "UNKNOWN_VALIDATOR");
    }

    #[test]
    fn test_issue_serialization_shape() {
        let issue = ValidationIssue::error(IssueCode::SelfRedirect, "loops to itself")
            .with_file("/c/pages/about/en.yml")
            .with_suggestion("Remove the redirect");
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["code"], "SELF_REDIRECT");
        assert_eq!(value["file"], "/c/pages/about/en.yml");
        assert_eq!(value["suggestion"], "Remove the redirect");
        assert!(value.get("line").is_none());
    }

    #[test]
    fn test_format_with_file_and_line() {
        let issue = ValidationIssue::warning(IssueCode::StaleFaq, "old")
            .with_file("faqs/en.yml")
            .with_line(12);
        assert_eq!(issue.format_human_readable(), "faqs/en.yml:12: [STALE_FAQ] old");
    }

    #[test]
    fn test_format_without_location() {
        let issue = ValidationIssue::warning(IssueCode::ThemeNotFound, "no theme");
        assert_eq!(issue.format_human_readable(), "[THEME_NOT_FOUND] no theme");
    }
}
