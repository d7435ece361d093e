// Raw category definitions - the tree shape loaded verbatim from storage
// These types mirror the on-disk document structure; version and mode
// filtering happens later in the composer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::resolved::ChildFoldersType;

/// One folder node of a raw category document.
///
/// Path templates live in `api_paths`, keyed by short labels; the four
/// `*_path` fields hold the label of the template to use for that path kind.
/// `contains` lists other top-level categories to inline as child folders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFolder {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub folders: BTreeMap<String, RawFolder>,
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub api_paths: BTreeMap<String, String>,
    #[serde(default)]
    pub attributes_path: Option<String>,
    #[serde(default)]
    pub subfolders_path: Option<String>,
    #[serde(default)]
    pub list_path: Option<String>,
    #[serde(default)]
    pub create_path: Option<String>,
    #[serde(default)]
    pub api_type: Option<String>,
    #[serde(default)]
    pub child_folders_type: Option<ChildFoldersType>,
    #[serde(default)]
    pub default_name_value: Option<String>,
    #[serde(default)]
    pub flattened_folder_data: Option<RawFlattenedFolder>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<RawAttributeVariant>>,
}

/// Data for a folder that exists in the management API's addressing but is
/// suppressed from the logical model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFlattenedFolder {
    pub api_type: String,
    pub name_value: String,
}

/// One mode-and-version-qualified definition of an attribute.
///
/// `mode` and `version` are required by the composer; they are optional here
/// so that their absence can be reported with folder-path context instead of
/// a bare deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttributeVariant {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub api_name: Option<String>,
    #[serde(default)]
    pub api_path: Option<String>,
    #[serde(default)]
    pub value_type: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub get_method: Option<String>,
    #[serde(default)]
    pub set_method: Option<String>,
    #[serde(default)]
    pub get_type: Option<String>,
    #[serde(default)]
    pub set_type: Option<String>,
    #[serde(default)]
    pub skip_api_name: Option<String>,
}
