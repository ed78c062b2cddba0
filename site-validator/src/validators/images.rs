//! Image registry integrity and image references in content.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::{Map, Value};
use site_content::walk::collect_strings_for_keys;

use super::{Source, load_source, site_path};
use crate::context::ValidationContext;
use crate::issue::{IssueCode, ValidationIssue};
use crate::registry::{EstimatedDuration, Validator, ValidatorCategory, ValidatorMetadata};
use crate::report::{ResultBuilder, ValidatorResult};

/// Content keys holding a registry image id.
pub const IMAGE_ID_KEYS: &[&str] = &["image_id", "imageId"];

fn non_blank<'a>(entry: &'a Value, key: &str) -> Option<&'a str> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone)]
pub struct ImagesValidator {
    registry_path: PathBuf,
    public_dir: PathBuf,
    max_file_size: u64,
}

impl ImagesValidator {
    #[must_use]
    pub fn new(
        registry_path: impl Into<PathBuf>,
        public_dir: impl Into<PathBuf>,
        max_file_size: u64,
    ) -> Self {
        Self {
            registry_path: registry_path.into(),
            public_dir: public_dir.into(),
            max_file_size,
        }
    }

    fn load_registry(&self, result: &mut ResultBuilder) -> Option<Map<String, Value>> {
        let value = match load_source(&self.registry_path, self.max_file_size) {
            Source::Loaded(value) => value,
            Source::Missing => {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::ImageRegistryNotFound,
                        format!(
                            "Image registry not found at {}",
                            self.registry_path.display()
                        ),
                    )
                    .with_suggestion("Set image_registry in site-validator.yml"),
                );
                return None;
            }
            Source::Invalid(e) => {
                result.push(
                    ValidationIssue::error(IssueCode::InvalidImageRegistry, e.to_string())
                        .with_file(&self.registry_path),
                );
                return None;
            }
        };

        match value {
            Value::Object(mut map) => match map.remove("images") {
                Some(Value::Object(images)) => Some(images),
                Some(_) => {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::InvalidImageRegistry,
                            "'images' must map image ids to entries",
                        )
                        .with_file(&self.registry_path),
                    );
                    None
                }
                None => Some(map),
            },
            Value::Null => Some(Map::new()),
            _ => {
                result.push(
                    ValidationIssue::error(
                        IssueCode::InvalidImageRegistry,
                        "Image registry must be a mapping of image ids",
                    )
                    .with_file(&self.registry_path),
                );
                None
            }
        }
    }

    fn check_entry(&self, id: &str, entry: &Value, check_files: bool, result: &mut ResultBuilder) {
        let Some(src) = non_blank(entry, "src") else {
            result.push(
                ValidationIssue::error(
                    IssueCode::MissingImageSrc,
                    format!("Image '{id}' has no src"),
                )
                .with_file(&self.registry_path),
            );
            return;
        };

        if non_blank(entry, "alt").is_none() {
            result.push(
                ValidationIssue::warning(
                    IssueCode::MissingAltText,
                    format!("Image '{id}' has no alt text"),
                )
                .with_file(&self.registry_path)
                .with_suggestion("Describe the image for screen readers"),
            );
        }

        if check_files
            && let Some(local) = site_path(src)
            && !self.public_dir.join(local.trim_start_matches('/')).is_file()
        {
            result.push(
                ValidationIssue::error(
                    IssueCode::ImageFileNotFound,
                    format!(
                        "Image '{id}' points to {src}, which is not in {}",
                        self.public_dir.display()
                    ),
                )
                .with_file(&self.registry_path),
            );
        }
    }
}

impl Validator for ImagesValidator {
    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            name: "images",
            description: "Checks the image registry and every image id referenced by content",
            category: ValidatorCategory::Content,
            api_exposed: true,
            estimated_duration: EstimatedDuration::Medium,
        }
    }

    fn run(&self, context: &ValidationContext) -> anyhow::Result<ValidatorResult> {
        let mut result = ResultBuilder::new(&self.metadata());
        let Some(registry) = self.load_registry(&mut result) else {
            return Ok(result.finish());
        };

        let check_files = self.public_dir.is_dir();
        if !check_files {
            tracing::debug!(path = %self.public_dir.display(), "public dir absent, skipping file checks");
        }
        for (id, entry) in &registry {
            self.check_entry(id, entry, check_files, &mut result);
        }

        let mut usage: BTreeMap<&str, usize> = registry.keys().map(|k| (k.as_str(), 0)).collect();
        for file in &context.content_files {
            for found in collect_strings_for_keys(&file.data, IMAGE_ID_KEYS) {
                let id = found.value.trim();
                if let Some(count) = usage.get_mut(id) {
                    *count += 1;
                } else {
                    result.push(
                        ValidationIssue::error(
                            IssueCode::UnknownImageId,
                            format!("{}: image id '{id}' is not registered", found.json_path),
                        )
                        .with_file(&file.file_path),
                    );
                }
            }
        }

        for (id, count) in &usage {
            if *count == 0 {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::OrphanedImage,
                        format!("Image '{id}' is not referenced by any content"),
                    )
                    .with_file(&self.registry_path),
                );
            }
        }

        result.artifact("registeredImages", registry.len());
        result.artifact("fileChecks", check_files);
        Ok(result.finish())
    }
}
