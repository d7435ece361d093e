// Resolved folder tree - the composer's output for one (version, mode) pair
// Nodes are built once per top-level category, cached for the life of the
// engine, and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Classification of a folder's children in the model.
///
/// A folder with no explicit declaration defaults to `Single`; this is a
/// deliberate, load-bearing default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildFoldersType {
    #[default]
    Single,
    Multiple,
    None,
}

impl fmt::Display for ChildFoldersType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ChildFoldersType::Single => "single",
            ChildFoldersType::Multiple => "multiple",
            ChildFoldersType::None => "none",
        };
        f.write_str(text)
    }
}

/// Mode-resolved data for a flattened pass-through folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedFolderData {
    pub api_type: String,
    pub name_value: String,
}

/// One attribute definition after variant resolution for the active
/// (version, mode) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAttribute {
    pub model_name: String,
    pub api_name: String,
    /// Label of the api_paths template this attribute is read/written under.
    /// Stripped from handoff copies; callers get path strings from the
    /// engine's path builders instead.
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
}

impl ResolvedAttribute {
    /// Copy handed to callers, with the internal path key removed.
    pub fn handoff_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.api_path = None;
        copy
    }
}

/// Attribute maps for one folder, present only when the raw folder declared
/// an attribute section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderAttributes {
    pub by_model_name: BTreeMap<String, ResolvedAttribute>,
    pub by_api_name: BTreeMap<String, ResolvedAttribute>,
    /// Attribute names whose variants exist but none matched the active
    /// version, mapped to the valid range for the active mode (None when no
    /// range was recorded for that mode).
    pub unresolved: BTreeMap<String, Option<String>>,
    /// API names suppressed entirely from by-api-name lookups.
    pub skip_names: BTreeSet<String>,
}

/// One folder of a composed category tree, specific to a fixed
/// (version, mode) pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFolder {
    /// Child folders that survived version filtering.
    pub folders: BTreeMap<String, Arc<ResolvedFolder>>,
    /// Child folders pruned by version filtering, mapped to the version range
    /// in which they are valid.
    pub unresolved_folders: BTreeMap<String, String>,
    pub child_folders_type: ChildFoldersType,
    pub api_type: Option<String>,
    pub default_name_value: Option<String>,
    pub flattened: Option<FlattenedFolderData>,
    pub api_paths: BTreeMap<String, String>,
    pub attributes_path: Option<String>,
    pub subfolders_path: Option<String>,
    pub list_path: Option<String>,
    pub create_path: Option<String>,
    pub attributes: Option<FolderAttributes>,
}
