//! Component registry integrity and section references.
//!
//! Registry layout: `{component}/{vN}/schema.{yml,yaml,json}` with example
//! documents under `{component}/{vN}/examples/`. A schema file may declare
//! `variants` (list of names) and `props` (a JSON Schema every example must
//! satisfy). Component names compare case-insensitively with `-` and `_`
//! treated alike, so `hero-banner/` registers sections of type `hero_banner`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use site_content::walk::collect_sections;
use walkdir::WalkDir;

use super::{Source, load_source};
use crate::context::ValidationContext;
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

const SCHEMA_FILE_NAMES: &[&str] = &["schema.yml", "schema.yaml", "schema.json"];

#[allow(clippy::expect_used)]
static VERSION_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v([1-9][0-9]*)$").expect("valid regex"));

fn normalize_component_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

/// Section `version` field: `2`, `"2"` or `"v2"`.
fn parse_section_version(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().trim_start_matches(['v', 'V']).parse().ok(),
        _ => None,
    }
}

/// One registered `{component}/{vN}` directory.
#[derive(Debug, Default)]
struct ComponentVersion {
    variants: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct RegisteredComponent {
    dir_name: String,
    versions: BTreeMap<u64, ComponentVersion>,
}

#[derive(Debug, Clone)]
pub struct ComponentsValidator {
    registry_dir: PathBuf,
    max_file_size: u64,
}

impl ComponentsValidator {
    #[must_use]
    pub fn new(registry_dir: impl Into<PathBuf>, max_file_size: u64) -> Self {
        Self {
            registry_dir: registry_dir.into(),
            max_file_size,
        }
    }

    fn sorted_subdirs(dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    tracing::warn!(error = %e, "component registry traversal error");
                    None
                }
            })
            .filter(|e| e.file_type().is_dir())
            .map(walkdir::DirEntry::into_path)
            .collect()
    }

    fn example_files(dir: &Path) -> Vec<PathBuf> {
        if !dir.is_dir() {
            return Vec::new();
        }
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| matches!(e, "yml" | "yaml" | "json"))
            })
            .collect()
    }

    /// Check one `{component}/{vN}` directory and return what it registers.
    fn load_version(&self, version_dir: &Path, result: &mut ResultBuilder) -> ComponentVersion {
        let mut version = ComponentVersion::default();

        let Some(schema_path) = SCHEMA_FILE_NAMES
            .iter()
            .map(|name| version_dir.join(name))
            .find(|p| p.is_file())
        else {
            result.push(
                ValidationIssue::error(
                    IssueCode::MissingComponentSchema,
                    format!("{} has no schema file", version_dir.display()),
                )
                .with_file(version_dir)
                .with_suggestion("Add schema.yml describing the component's props and variants"),
            );
            return version;
        };

        let schema = match load_source(&schema_path, self.max_file_size) {
            Source::Loaded(value) if value.is_object() => value,
            Source::Loaded(_) => {
                result.push(
                    ValidationIssue::error(
                        IssueCode::InvalidComponentSchema,
                        "Component schema must be a mapping",
                    )
                    .with_file(&schema_path),
                );
                return version;
            }
            Source::Invalid(e) => {
                result.push(
                    ValidationIssue::error(IssueCode::InvalidComponentSchema, e.to_string())
                        .with_file(&schema_path),
                );
                return version;
            }
            Source::Missing => return version,
        };

        match schema.get("variants") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for item in items {
                    match item.as_str() {
                        Some(name) => {
                            version.variants.insert(name.to_owned());
                        }
                        None => result.push(
                            ValidationIssue::error(
                                IssueCode::InvalidComponentSchema,
                                format!("Variant names must be strings, found {item}"),
                            )
                            .with_file(&schema_path),
                        ),
                    }
                }
            }
            Some(other) => result.push(
                ValidationIssue::error(
                    IssueCode::InvalidComponentSchema,
                    format!("'variants' must be a list, found {other}"),
                )
                .with_file(&schema_path),
            ),
        }

        let props_validator = match schema.get("props") {
            None | Some(Value::Null) => None,
            Some(props) => match jsonschema::validator_for(props) {
                Ok(v) => Some(v),
                Err(e) => {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::InvalidComponentSchema,
                            format!("'props' is not a valid JSON Schema: {e}"),
                        )
                        .with_file(&schema_path),
                    );
                    None
                }
            },
        };

        let examples = Self::example_files(&version_dir.join("examples"));
        if examples.is_empty() {
            result.push(
                ValidationIssue::warning(
                    IssueCode::MissingComponentExamples,
                    format!("{} has no examples", version_dir.display()),
                )
                .with_file(version_dir)
                .with_suggestion("Add at least one example under examples/"),
            );
        }

        for example in &examples {
            let instance = match load_source(example, self.max_file_size) {
                Source::Loaded(value) => value,
                Source::Invalid(e) => {
                    result.push(
                        ValidationIssue::error(IssueCode::InvalidComponentExample, e.to_string())
                            .with_file(example),
                    );
                    continue;
                }
                Source::Missing => continue,
            };
            if let Some(validator) = &props_validator {
                for error in validator.iter_errors(&instance) {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::InvalidComponentExample,
                            format!("Example does not match props schema: {error}"),
                        )
                        .with_file(example),
                    );
                }
            }
        }

        version
    }

    fn load_registry(&self, result: &mut ResultBuilder) -> BTreeMap<String, RegisteredComponent> {
        let mut registry: BTreeMap<String, RegisteredComponent> = BTreeMap::new();

        for component_dir in Self::sorted_subdirs(&self.registry_dir) {
            let Some(dir_name) = component_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let mut component = RegisteredComponent {
                dir_name: dir_name.to_owned(),
                ..RegisteredComponent::default()
            };
            for version_dir in Self::sorted_subdirs(&component_dir) {
                let Some(number) = version_dir
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|n| VERSION_DIR.captures(n))
                    .and_then(|c| c[1].parse::<u64>().ok())
                else {
                    tracing::debug!(path = %version_dir.display(), "skipping non-version directory");
                    continue;
                };
                let version = self.load_version(&version_dir, result);
                component.versions.insert(number, version);
            }
            registry.insert(normalize_component_name(dir_name), component);
        }
        registry
    }
}

impl Validator for ComponentsValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "components",
            description: "Checks the component registry and every section's component, version and variant",
            category: ValidatorCategory::Components,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Medium,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());

        if !self.registry_dir.is_dir() {
            result.push(
                ValidationIssue::warning(
                    IssueCode::ComponentRegistryNotFound,
                    format!(
                        "Component registry not found at {}",
                        self.registry_dir.display()
                    ),
                )
                .with_suggestion("Set component_registry in site-validator.yml"),
            );
            return Ok(result.finish());
        }

        let registry = self.load_registry(&mut result);
        let mut used: BTreeSet<String> = BTreeSet::new();
        let mut sections_checked = 0_usize;

        for file in &context.content_files {
            for (json_path, section) in collect_sections(&file.data) {
                let Some(kind) = section.get("type").and_then(Value::as_str) else {
                    continue;
                };
                sections_checked += 1;
                let name = normalize_component_name(kind);
                let Some(component) = registry.get(&name) else {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::UnregisteredComponent,
                            format!("{json_path}: section type '{kind}' is not in the component registry"),
                        )
                        .with_file(&file.file_path),
                    );
                    continue;
                };
                used.insert(name);

                let version = section.get("version");
                let version_number = version.and_then(parse_section_version);
                if let Some(raw) = version
                    && version_number.is_none_or(|n| !component.versions.contains_key(&n))
                {
                    let known = component
                        .versions
                        .keys()
                        .map(|n| format!("v{n}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    result.push(
                        ValidationIssue::error(
                            IssueCode::UnknownComponentVersion,
                            format!("{json_path}: '{kind}' has no version {raw}"),
                        )
                        .with_file(&file.file_path)
                        .with_suggestion(format!("Registered versions: {known}")),
                    );
                    continue;
                }

                if let Some(variant) = section.get("variant").and_then(Value::as_str) {
                    let declared: BTreeSet<&str> = match version_number {
                        Some(n) => component
                            .versions
                            .get(&n)
                            .map(|v| v.variants.iter().map(String::as_str).collect())
                            .unwrap_or_default(),
                        None => component
                            .versions
                            .values()
                            .flat_map(|v| v.variants.iter().map(String::as_str))
                            .collect(),
                    };
                    if !declared.contains(variant) {
                        result.push(
                            ValidationIssue::error(
                                IssueCode::UnknownComponentVariant,
                                format!("{json_path}: '{kind}' has no variant '{variant}'"),
                            )
                            .with_file(&file.file_path),
                        );
                    }
                }
            }
        }

        for (name, component) in &registry {
            if !used.contains(name) {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::OrphanedComponent,
                        format!("Component '{}' is not used by any content", component.dir_name),
                    )
                    .with_file(self.registry_dir.join(&component.dir_name)),
                );
            }
        }

        result.artifact("registeredComponents", registry.len());
        result.artifact("sectionsChecked", sections_checked);
        Ok(result.finish())
    }
}
