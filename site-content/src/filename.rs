//! Content file naming conventions.
//!
//! - `en.yml`, `es.yaml`: base content for a locale
//! - `landing.es.yml`: any name followed by a locale suffix
//! - `promo.v2.es.yml`: variant `promo`, version 2, locale `es`
//! - `content.yml`: no locale suffix, defaults to [`DEFAULT_LOCALE`]
//! - `_draft.yml`: underscore-prefixed files are ignored

use std::sync::LazyLock;

use regex::Regex;

use crate::model::DEFAULT_LOCALE;

#[allow(clippy::expect_used)]
static LOCALE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.+\.)?([a-z]{2})\.ya?ml$").expect("locale pattern is a valid regex")
});

#[allow(clippy::expect_used)]
static VARIANT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9_-]+)\.v([1-9][0-9]*)\.([a-z]{2})\.ya?ml$")
        .expect("variant pattern is a valid regex")
});

/// Locale, variant and version encoded in a content file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameParts {
    pub locale: String,
    pub variant: Option<String>,
    pub version: Option<u32>,
}

/// Whether a file name denotes a content file the loader should parse.
#[must_use]
pub fn is_content_file_name(name: &str) -> bool {
    !name.starts_with('_')
        && std::path::Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
}

/// Split a content file name into its locale/variant/version parts.
///
/// A name that does not match the variant pattern is base content.
#[must_use]
pub fn parse_file_name(name: &str) -> FileNameParts {
    if let Some(caps) = VARIANT_PATTERN.captures(name)
        && let Ok(version) = caps[2].parse::<u32>()
    {
        return FileNameParts {
            locale: caps[3].to_owned(),
            variant: Some(caps[1].to_owned()),
            version: Some(version),
        };
    }

    let locale = LOCALE_PATTERN
        .captures(name)
        .map_or_else(|| DEFAULT_LOCALE.to_owned(), |caps| caps[1].to_owned());

    FileNameParts {
        locale,
        variant: None,
        version: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_locale_file() {
        let parts = parse_file_name("es.yml");
        assert_eq!(parts.locale, "es");
        assert!(parts.variant.is_none());
        assert!(parts.version.is_none());
    }

    #[test]
    fn test_named_locale_file() {
        assert_eq!(parse_file_name("landing.es.yaml").locale, "es");
    }

    #[test]
    fn test_missing_locale_defaults_to_en() {
        assert_eq!(parse_file_name("content.yml").locale, "en");
    }

    #[test]
    fn test_variant_and_version() {
        let parts = parse_file_name("promo.v2.es.yml");
        assert_eq!(parts.locale, "es");
        assert_eq!(parts.variant.as_deref(), Some("promo"));
        assert_eq!(parts.version, Some(2));
    }

    #[test]
    fn test_version_zero_is_not_a_variant() {
        let parts = parse_file_name("promo.v0.en.yml");
        assert!(parts.variant.is_none());
        assert_eq!(parts.locale, "en");
    }

    #[test]
    fn test_content_file_name_filter() {
        assert!(is_content_file_name("en.yml"));
        assert!(is_content_file_name("promo.v1.en.yaml"));
        assert!(!is_content_file_name("_draft.en.yml"));
        assert!(!is_content_file_name("notes.md"));
    }
}
