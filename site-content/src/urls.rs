//! Canonical URL resolution.
//!
//! Every content file has exactly one public URL computed from its type,
//! locale and slug. The set of all such URLs plus [`STATIC_ROUTES`] is the
//! ground truth for "does this path correspond to real content".

use std::collections::BTreeSet;

use crate::model::{ContentFile, ContentType};

/// Routes served by the application that have no content file behind them.
pub const STATIC_ROUTES: &[&str] = &[
    "/",
    "/en",
    "/es",
    "/en/career-programs",
    "/es/programas-de-carrera",
    "/en/locations",
    "/es/ubicaciones",
    "/en/apply",
    "/es/aplica",
    "/en/contact",
    "/es/contacto",
    "/en/blog",
    "/es/blog",
    "/en/privacy-policy",
    "/es/politica-de-privacidad",
    "/en/terms-and-conditions",
    "/es/terminos-y-condiciones",
    "/en/cookies",
    "/es/cookies",
];

/// Path prefix for a `(type, locale)` pair; `None` when no template exists.
fn url_prefix(content_type: ContentType, locale: &str) -> Option<&'static str> {
    match (content_type, locale) {
        (ContentType::Program, "en") => Some("/en/career-programs/"),
        (ContentType::Program, "es") => Some("/es/programas-de-carrera/"),
        (ContentType::Landing, "en") => Some("/en/landing/"),
        (ContentType::Landing, "es") => Some("/es/landing/"),
        (ContentType::Location, "en") => Some("/en/locations/"),
        (ContentType::Location, "es") => Some("/es/ubicaciones/"),
        (ContentType::Page, "en") => Some("/en/"),
        (ContentType::Page, "es") => Some("/es/"),
        _ => None,
    }
}

/// Canonical URL for a type/locale/slug triple. Falls back to `/{slug}`.
#[must_use]
pub fn canonical_url_for(content_type: ContentType, locale: &str, slug: &str) -> String {
    match url_prefix(content_type, locale) {
        Some(prefix) => format!("{prefix}{slug}"),
        None => format!("/{slug}"),
    }
}

/// Canonical URL of a content file.
#[must_use]
pub fn canonical_url(file: &ContentFile) -> String {
    canonical_url_for(file.content_type, &file.locale, &file.slug)
}

/// Normalize a site-relative URL for comparison.
///
/// Ensures a leading slash, lowercases, and strips any run of trailing slashes
/// and whitespace except for the root. `""` normalizes to `/`. Idempotent.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let mut normalized = url
        .trim()
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .to_lowercase();
    if !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }
    normalized
}

/// Union of all normalized canonical URLs and [`STATIC_ROUTES`].
pub fn build_valid_url_set<'a, I>(files: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a ContentFile>,
{
    let mut urls: BTreeSet<String> = STATIC_ROUTES.iter().map(|r| normalize_url(r)).collect();
    urls.extend(files.into_iter().map(|f| normalize_url(&canonical_url(f))));
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(content_type: ContentType, locale: &str, slug: &str) -> ContentFile {
        ContentFile {
            slug: slug.to_owned(),
            title: slug.to_owned(),
            content_type,
            locale: locale.to_owned(),
            file_path: PathBuf::from(format!("/c/{slug}/{locale}.yml")),
            variant: None,
            version: None,
            meta: None,
            schema: None,
            data: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_program_templates() {
        assert_eq!(
            canonical_url(&file(ContentType::Program, "en", "data-science")),
            "/en/career-programs/data-science"
        );
        assert_eq!(
            canonical_url(&file(ContentType::Program, "es", "data-science")),
            "/es/programas-de-carrera/data-science"
        );
    }

    #[test]
    fn test_location_and_page_templates() {
        assert_eq!(
            canonical_url_for(ContentType::Location, "es", "madrid"),
            "/es/ubicaciones/madrid"
        );
        assert_eq!(canonical_url_for(ContentType::Page, "en", "about"), "/en/about");
        assert_eq!(
            canonical_url_for(ContentType::Landing, "en", "free-course"),
            "/en/landing/free-course"
        );
    }

    #[test]
    fn test_missing_template_falls_back_to_slug() {
        assert_eq!(canonical_url_for(ContentType::Page, "fr", "about"), "/about");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/Foo/"), "/foo");
        assert_eq!(normalize_url(""), "/");
        assert_eq!(normalize_url("/"), "/");
        assert_eq!(normalize_url("en/About//"), "/en/about");
        assert_eq!(normalize_url("  /es/Blog "), "/es/blog");
        assert_eq!(normalize_url("/en/about /"), "/en/about");
    }

    #[test]
    fn test_normalize_url_is_idempotent() {
        for url in [
            "",
            "/",
            "/Foo/",
            "a/b/",
            "//",
            " /X ",
            "/a /",
            "a/ /",
            "/en/career-programs/Web/",
        ] {
            let once = normalize_url(url);
            assert_eq!(normalize_url(&once), once, "not idempotent for {url:?}");
        }
    }

    #[test]
    fn test_valid_url_set_includes_content_and_static_routes() {
        let files = [
            file(ContentType::Program, "en", "Web-Dev"),
            file(ContentType::Page, "es", "nosotros"),
        ];
        let urls = build_valid_url_set(&files);
        assert!(urls.contains("/en/career-programs/web-dev"));
        assert!(urls.contains("/es/nosotros"));
        assert!(urls.contains("/"));
        assert!(urls.contains("/en/contact"));
    }
}
