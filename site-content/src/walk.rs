//! Recursive walks over parsed content trees.
//!
//! Paths are reported in JSONPath-like form (`$.sections[2].cta.title`).
//! Recursion stops at [`MAX_WALK_DEPTH`].

use serde_json::Value;

/// Maximum nesting depth visited by the walkers.
pub const MAX_WALK_DEPTH: usize = 64;

/// A string value found under a particular key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedString<'a> {
    pub json_path: String,
    pub key: String,
    pub value: &'a str,
}

fn child_path(parent: &str, key: &str) -> String {
    format!("{parent}.{key}")
}

fn index_path(parent: &str, idx: usize) -> String {
    format!("{parent}[{idx}]")
}

/// Visit every string leaf together with its path.
pub fn walk_strings<'a, F>(value: &'a Value, json_path: &str, visit: &mut F)
where
    F: FnMut(&str, &'a str),
{
    walk_strings_inner(value, json_path, visit, 0);
}

fn walk_strings_inner<'a, F>(value: &'a Value, json_path: &str, visit: &mut F, depth: usize)
where
    F: FnMut(&str, &'a str),
{
    if depth > MAX_WALK_DEPTH {
        return;
    }
    match value {
        Value::String(s) => visit(json_path, s),
        Value::Object(map) => {
            for (k, v) in map {
                walk_strings_inner(v, &child_path(json_path, k), visit, depth + 1);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                walk_strings_inner(v, &index_path(json_path, i), visit, depth + 1);
            }
        }
        _ => {}
    }
}

/// Visit every key/value pair of every object in the tree.
///
/// The callback receives the path of the entry, its key, and its value.
pub fn walk_entries<'a, F>(value: &'a Value, json_path: &str, visit: &mut F)
where
    F: FnMut(&str, &str, &'a Value),
{
    walk_entries_inner(value, json_path, visit, 0);
}

fn walk_entries_inner<'a, F>(value: &'a Value, json_path: &str, visit: &mut F, depth: usize)
where
    F: FnMut(&str, &str, &'a Value),
{
    if depth > MAX_WALK_DEPTH {
        return;
    }
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let path = child_path(json_path, k);
                visit(&path, k, v);
                walk_entries_inner(v, &path, visit, depth + 1);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                walk_entries_inner(v, &index_path(json_path, i), visit, depth + 1);
            }
        }
        _ => {}
    }
}

/// Collect all non-empty string values stored under any of `keys`.
#[must_use]
pub fn collect_strings_for_keys<'a>(value: &'a Value, keys: &[&str]) -> Vec<KeyedString<'a>> {
    let mut found = Vec::new();
    walk_entries(value, "$", &mut |path, key, v| {
        if keys.contains(&key)
            && let Some(s) = v.as_str()
            && !s.trim().is_empty()
        {
            found.push(KeyedString {
                json_path: path.to_owned(),
                key: key.to_owned(),
                value: s,
            });
        }
    });
    found
}

/// Collect every object inside a `sections` array, at any depth.
///
/// Nested layouts (tabs, columns) carry their own `sections`; those are
/// returned too, after their parent.
#[must_use]
pub fn collect_sections(value: &Value) -> Vec<(String, &Value)> {
    let mut sections = Vec::new();
    walk_entries(value, "$", &mut |path, key, v| {
        if key == "sections"
            && let Some(items) = v.as_array()
        {
            for (i, item) in items.iter().enumerate() {
                if item.is_object() {
                    sections.push((index_path(path, i), item));
                }
            }
        }
    });
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "title": "Home",
            "sections": [
                {"type": "hero", "heading": "Learn", "image_id": "hero-1"},
                {"type": "tabs", "sections": [{"type": "faq", "image_id": "faq-art"}]},
                "stray string"
            ],
            "meta": {"page_title": "Home | Academy"}
        })
    }

    #[test]
    fn test_walk_strings_reports_paths() {
        let value = sample();
        let mut seen = Vec::new();
        walk_strings(&value, "$", &mut |path, s| seen.push((path.to_owned(), s.to_owned())));
        assert!(seen.contains(&("$.title".to_owned(), "Home".to_owned())));
        assert!(seen.contains(&("$.sections[0].heading".to_owned(), "Learn".to_owned())));
        assert!(seen.contains(&("$.sections[2]".to_owned(), "stray string".to_owned())));
    }

    #[test]
    fn test_collect_strings_for_keys_is_recursive() {
        let value = sample();
        let found = collect_strings_for_keys(&value, &["image_id"]);
        let values: Vec<&str> = found.iter().map(|k| k.value).collect();
        assert_eq!(values, vec!["hero-1", "faq-art"]);
        assert_eq!(found[1].json_path, "$.sections[1].sections[0].image_id");
    }

    #[test]
    fn test_collect_sections_includes_nested() {
        let value = sample();
        let sections = collect_sections(&value);
        let types: Vec<&str> = sections
            .iter()
            .filter_map(|(_, s)| s.get("type").and_then(Value::as_str))
            .collect();
        assert_eq!(types, vec!["hero", "tabs", "faq"]);
    }

    #[test]
    fn test_depth_limit_stops_recursion() {
        let mut value = json!("leaf");
        for _ in 0..(MAX_WALK_DEPTH + 10) {
            value = json!({ "n": value });
        }
        let mut count = 0;
        walk_strings(&value, "$", &mut |_, _| count += 1);
        assert_eq!(count, 0);
    }
}
