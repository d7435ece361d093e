use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::model::category::RawFolder;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("category '{name}' not found in the definition source")]
    CategoryNotFound { name: String },
    #[error("failed to read category '{name}' from {path}")]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse category '{name}'")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to parse category '{name}'")]
    ParseJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplier of raw category definitions, addressable by category name.
///
/// The engine loads each category at most once; implementations do not need
/// to cache.
pub trait CategorySource {
    /// Name of the implicit root category resolved for the empty location.
    fn root_category(&self) -> &str;

    /// Names of every top-level category the source can supply, including
    /// the root category.
    fn category_names(&self) -> Result<Vec<String>, SourceError>;

    fn load_category(&self, name: &str) -> Result<RawFolder, SourceError>;
}

/// Reads `<dir>/<Category>.yaml` (or `.yml`/`.json`) documents.
pub struct YamlDirectorySource {
    dir: PathBuf,
    root_category: String,
}

impl YamlDirectorySource {
    pub fn new(dir: impl Into<PathBuf>, root_category: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            root_category: root_category.into(),
        }
    }

    fn category_path(&self, name: &str) -> Option<PathBuf> {
        for extension in ["yaml", "yml", "json"] {
            let path = self.dir.join(format!("{name}.{extension}"));
            if path.is_file() {
                return Some(path);
            }
        }
        None
    }
}

impl CategorySource for YamlDirectorySource {
    fn root_category(&self) -> &str {
        &self.root_category
    }

    fn category_names(&self) -> Result<Vec<String>, SourceError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| SourceError::Io {
            name: String::new(),
            path: self.dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| SourceError::Io {
                    name: String::new(),
                    path: self.dir.clone(),
                    source,
                })?
                .path();
            if is_category_file(&path) {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn load_category(&self, name: &str) -> Result<RawFolder, SourceError> {
        let path = self
            .category_path(name)
            .ok_or_else(|| SourceError::CategoryNotFound {
                name: name.to_string(),
            })?;
        debug!(category = name, path = %path.display(), "loading category definition");
        let is_json = path.extension().and_then(|extension| extension.to_str()) == Some("json");
        let text = std::fs::read_to_string(&path).map_err(|source| SourceError::Io {
            name: name.to_string(),
            path,
            source,
        })?;
        if is_json {
            serde_json::from_str(&text).map_err(|source| SourceError::ParseJson {
                name: name.to_string(),
                source,
            })
        } else {
            serde_yaml::from_str(&text).map_err(|source| SourceError::Parse {
                name: name.to_string(),
                source,
            })
        }
    }
}

fn is_category_file(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|extension| extension.to_str()),
            Some("yaml") | Some("yml") | Some("json")
        )
}

/// In-memory source holding pre-built raw definitions, used by tests and by
/// callers that assemble category trees programmatically.
pub struct StaticCategorySource {
    root_category: String,
    categories: BTreeMap<String, RawFolder>,
}

impl StaticCategorySource {
    pub fn new(root_category: impl Into<String>) -> Self {
        Self {
            root_category: root_category.into(),
            categories: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, folder: RawFolder) -> &mut Self {
        self.categories.insert(name.into(), folder);
        self
    }
}

impl CategorySource for StaticCategorySource {
    fn root_category(&self) -> &str {
        &self.root_category
    }

    fn category_names(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.categories.keys().cloned().collect())
    }

    fn load_category(&self, name: &str) -> Result<RawFolder, SourceError> {
        self.categories
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::CategoryNotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_round_trips_categories() {
        let mut source = StaticCategorySource::new("Domain");
        source.insert("Domain", RawFolder::default());
        source.insert("Server", RawFolder::default());

        assert_eq!(source.root_category(), "Domain");
        assert_eq!(
            source.category_names().unwrap(),
            vec!["Domain".to_string(), "Server".to_string()]
        );
        assert!(source.load_category("Server").is_ok());
        assert!(matches!(
            source.load_category("Cluster"),
            Err(SourceError::CategoryNotFound { .. })
        ));
    }

    #[test]
    fn yaml_source_parses_category_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Server.yaml"),
            "api_paths:\n  WP001: /Server/%SERVER%\nattributes_path: WP001\n",
        )
        .unwrap();

        let source = YamlDirectorySource::new(dir.path(), "Server");
        assert_eq!(source.category_names().unwrap(), vec!["Server".to_string()]);
        let folder = source.load_category("Server").unwrap();
        assert_eq!(
            folder.api_paths.get("WP001").map(String::as_str),
            Some("/Server/%SERVER%")
        );
        assert_eq!(folder.attributes_path.as_deref(), Some("WP001"));
    }

    #[test]
    fn json_category_documents_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cluster.json"),
            r#"{"api_paths": {"WP001": "/Cluster/%CLUSTER%"}, "attributes_path": "WP001"}"#,
        )
        .unwrap();

        let source = YamlDirectorySource::new(dir.path(), "Cluster");
        let folder = source.load_category("Cluster").unwrap();
        assert_eq!(
            folder.api_paths.get("WP001").map(String::as_str),
            Some("/Cluster/%CLUSTER%")
        );
    }
}
