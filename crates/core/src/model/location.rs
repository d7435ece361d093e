// Location context - caller-owned address of a folder in the model tree
// Holds the ordered folder names plus the name-token bindings used to turn
// templated API paths into concrete ones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An ordered stack of model folder names plus a map of name-token bindings.
///
/// The engine never mutates a caller's location; callers extend it through the
/// explicit append operations while walking the model tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    folders: Vec<String>,
    #[serde(default)]
    name_tokens: BTreeMap<String, String>,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a location from folder names only, with no token bindings.
    pub fn from_folders<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            folders: folders.into_iter().map(Into::into).collect(),
            name_tokens: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    /// Append a folder name, returning `self` so calls can be chained.
    pub fn append_folder(&mut self, name: impl Into<String>) -> &mut Self {
        self.folders.push(name.into());
        self
    }

    /// Remove and return the deepest folder name.
    pub fn pop_folder(&mut self) -> Option<String> {
        self.folders.pop()
    }

    pub fn add_name_token(&mut self, token: impl Into<String>, name: impl Into<String>) -> &mut Self {
        self.name_tokens.insert(token.into(), name.into());
        self
    }

    pub fn name_for_token(&self, token: &str) -> Option<&str> {
        self.name_tokens.get(token).map(String::as_str)
    }

    pub fn name_tokens(&self) -> &BTreeMap<String, String> {
        &self.name_tokens
    }

    /// Slash-delimited folder path, `/` for the empty (root) location.
    pub fn folder_path(&self) -> String {
        if self.folders.is_empty() {
            "/".to_string()
        } else {
            let mut path = String::new();
            for folder in &self.folders {
                path.push('/');
                path.push_str(folder);
            }
            path
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.folder_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_location_renders_root_path() {
        let location = Location::new();
        assert!(location.is_empty());
        assert_eq!(location.folder_path(), "/");
    }

    #[test]
    fn append_and_pop_round_trip() {
        let mut location = Location::from_folders(["Server"]);
        location.append_folder("Log");
        assert_eq!(location.folder_path(), "/Server/Log");
        assert_eq!(location.pop_folder(), Some("Log".to_string()));
        assert_eq!(location.folder_path(), "/Server");
    }

    #[test]
    fn name_tokens_are_looked_up_by_token_name() {
        let mut location = Location::from_folders(["Server"]);
        location.add_name_token("SERVER", "admin");
        assert_eq!(location.name_for_token("SERVER"), Some("admin"));
        assert_eq!(location.name_for_token("CLUSTER"), None);
    }
}
