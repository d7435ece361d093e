// Tolerant validation - classify folder and attribute names for callers
// that report findings instead of aborting on the first unknown name.

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::model::location::Location;
use crate::resolver::engine::SchemaEngine;

/// Outcome class for a tolerant name check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    /// The name resolves at the engine's version and mode.
    Valid,
    /// The name is known to the schema but not at the engine's version or
    /// mode.
    VersionInvalid,
    /// The name is not known to the schema at all.
    Invalid,
}

/// Result of validating a folder or attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameValidation {
    pub code: ValidationCode,
    /// Version range in which the name is valid, when one is recorded.
    pub valid_version_range: Option<String>,
}

impl NameValidation {
    fn valid() -> Self {
        Self {
            code: ValidationCode::Valid,
            valid_version_range: None,
        }
    }

    fn version_invalid(valid_version_range: Option<String>) -> Self {
        Self {
            code: ValidationCode::VersionInvalid,
            valid_version_range,
        }
    }

    fn invalid() -> Self {
        Self {
            code: ValidationCode::Invalid,
            valid_version_range: None,
        }
    }
}

/// Result of checking whether a whole location is live at the engine's
/// version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationValidation {
    pub code: ValidationCode,
    /// Logical model path of the checked location, for reporting.
    pub model_path: Option<String>,
}

impl SchemaEngine {
    /// Classify a child folder name under a parent location.
    pub fn validate_folder_name(
        &self,
        parent: &Location,
        folder_name: &str,
    ) -> Result<NameValidation> {
        if parent.is_empty() {
            if self.is_top_level_folder(folder_name) {
                let mut location = Location::new();
                location.append_folder(folder_name.to_string());
                return match self.node_for_location(&location, false)? {
                    Some(_) => Ok(NameValidation::valid()),
                    None => Ok(NameValidation::version_invalid(
                        self.top_level_unresolved_range(folder_name),
                    )),
                };
            }
            debug!(folder = folder_name, "unknown top-level folder");
            return Ok(NameValidation::invalid());
        }

        let Some(node) = self.node_for_location(parent, false)? else {
            // Parent itself is off-version; its children inherit the range.
            let range = self.valid_version_range_for_folder(parent).ok();
            return Ok(NameValidation::version_invalid(range));
        };

        if node.folders.contains_key(folder_name) {
            Ok(NameValidation::valid())
        } else if let Some(range) = node.unresolved_folders.get(folder_name) {
            Ok(NameValidation::version_invalid(Some(range.clone())))
        } else {
            debug!(folder = folder_name, parent = %parent, "unknown folder name");
            Ok(NameValidation::invalid())
        }
    }

    /// Classify an attribute name at a location.
    pub fn validate_attribute_name(
        &self,
        location: &Location,
        attribute_name: &str,
    ) -> Result<NameValidation> {
        let Some(node) = self.node_for_location(location, false)? else {
            let range = self.valid_version_range_for_folder(location).ok();
            return Ok(NameValidation::version_invalid(range));
        };

        let Some(attributes) = node.attributes.as_ref() else {
            return Err(SchemaError::MissingEntry {
                path: location.folder_path(),
                key: "attributes".to_string(),
            });
        };

        if attributes.by_model_name.contains_key(attribute_name) {
            Ok(NameValidation::valid())
        } else if let Some(range) = attributes.unresolved.get(attribute_name) {
            Ok(NameValidation::version_invalid(range.clone()))
        } else {
            debug!(attribute = attribute_name, location = %location, "unknown attribute name");
            Ok(NameValidation::invalid())
        }
    }

    /// Is the whole location live at the engine's version and mode?
    pub fn validate_location_version(&self, location: &Location) -> Result<LocationValidation> {
        match self.api_type_for_location(location) {
            Ok(Some(_)) => Ok(LocationValidation {
                code: ValidationCode::Valid,
                model_path: Some(self.model_folder_path_for_location(location)?),
            }),
            Ok(None) => Ok(LocationValidation {
                code: ValidationCode::VersionInvalid,
                model_path: self.model_folder_path_for_location(location).ok(),
            }),
            Err(SchemaError::UnknownFolder { .. }) | Err(SchemaError::UnknownCategory { .. }) => {
                Ok(LocationValidation {
                    code: ValidationCode::Invalid,
                    model_path: None,
                })
            }
            Err(err) => Err(err),
        }
    }
}
