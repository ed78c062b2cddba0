//! # site-content
//!
//! Content model and loading for a YAML-driven marketing site.
//!
//! Content lives under a directory tree organized as
//! `{programs,landings,locations,pages}/{slug}/{files}`. This crate turns that
//! tree into flat [`ContentFile`] descriptors, computes canonical URLs, and
//! flattens the structured-data definition document into schema keys.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use site_content::{ContentLoader, LoaderConfig, build_valid_url_set, canonical_url};
//!
//! let loader = ContentLoader::new(LoaderConfig::new("src/content"));
//! let files = loader.load_all_content();
//! for file in &files {
//!     println!("{} -> {}", file.file_path.display(), canonical_url(file));
//! }
//! let urls = build_valid_url_set(&files);
//! println!("{} valid URLs", urls.len());
//! ```

mod error;
pub mod filename;
mod loader;
mod model;
pub mod schema_keys;
pub mod urls;
pub mod walk;
pub mod yaml;

pub use error::{ContentError, SkippedFile};
pub use loader::{ContentLoader, LoadOutcome, LoaderConfig, parse_content_file};
pub use model::{ContentFile, ContentMeta, ContentType, DEFAULT_LOCALE, Priority, SchemaConfig};
pub use schema_keys::{available_schema_keys, get_available_schema_keys, load_schema_definitions};
pub use urls::{build_valid_url_set, canonical_url, normalize_url};
