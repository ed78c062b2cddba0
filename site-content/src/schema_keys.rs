//! Structured-data definition keys.
//!
//! The definition document maps schema keys to JSON-LD templates. Two
//! categories nest one level deeper and are addressed as `category:subkey`:
//!
//! ```yaml
//! organization: { "@type": Organization, ... }
//! courses:
//!   bootcamp: { "@type": Course, ... }
//! ```
//!
//! yields the keys `organization` and `courses:bootcamp`.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;

use crate::yaml::read_yaml_file;

/// Top-level keys whose children are addressed as `category:subkey`.
pub const NESTED_SCHEMA_CATEGORIES: &[&str] = &["courses", "item_lists"];

/// Load the structured-data definition document.
///
/// A missing or unreadable file yields `Value::Null` with a warning so that
/// reference checks degrade to "no valid references" instead of failing.
#[must_use]
pub fn load_schema_definitions(path: &Path, max_file_size: u64) -> Value {
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "schema definition file not found");
        return Value::Null;
    }
    match read_yaml_file(path, max_file_size) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load schema definitions");
            Value::Null
        }
    }
}

/// Flatten a definition document into its addressable keys.
#[must_use]
pub fn available_schema_keys(definitions: &Value) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    let Some(top) = definitions.as_object() else {
        return keys;
    };

    for (key, value) in top {
        if NESTED_SCHEMA_CATEGORIES.contains(&key.as_str()) {
            if let Some(nested) = value.as_object() {
                keys.extend(nested.keys().map(|sub| format!("{key}:{sub}")));
            }
        } else {
            keys.insert(key.clone());
        }
    }
    keys
}

/// Convenience wrapper: load the document at `path` and flatten its keys.
#[must_use]
pub fn get_available_schema_keys(path: &Path, max_file_size: u64) -> BTreeSet<String> {
    available_schema_keys(&load_schema_definitions(path, max_file_size))
}

/// Look up the definition addressed by a schema key.
#[must_use]
pub fn resolve_schema_definition<'a>(definitions: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some((category, sub)) = key.split_once(':') {
        if !NESTED_SCHEMA_CATEGORIES.contains(&category) {
            return None;
        }
        return definitions.get(category)?.get(sub);
    }
    if NESTED_SCHEMA_CATEGORIES.contains(&key) {
        return None;
    }
    definitions.get(key)
}
