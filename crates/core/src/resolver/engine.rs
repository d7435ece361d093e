// Schema engine - main resolution entry point
// Binds a category source to one fixed (version, mode) pair, composes
// categories on first access, and answers location queries: node lookup,
// path building, name tokens, instance names and attribute entries.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};
use crate::model::location::Location;
use crate::model::resolved::{ChildFoldersType, ResolvedAttribute, ResolvedFolder};
use crate::model::store::CategorySource;
use crate::resolver::composer::{compose_category, CategoryCache};
use crate::resolver::tokens::{
    count_token_occurrences, replace_path_tokens, strip_trailing_segments, token_value,
    whole_value_token,
};
use crate::resolver::version::{Mode, ModelVersion};

/// Fixed marker for the logical model root, returned for the empty location.
pub const MODEL_ROOT_PATH: &str = "model:/";

/// External names treated as silently absent identity/bookkeeping fields
/// rather than unknown attributes.
const IGNORED_API_NAMES: [&str; 6] = ["DynamicallyCreated", "Id", "Name", "Tag", "Tags", "Type"];

/// The four path flavors derivable for a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Where the folder's attributes are read and written.
    Attributes,
    /// Where the folder's subfolders are found.
    Subfolders,
    /// Where existing instances of the folder's type are listed.
    List,
    /// Where new instances of the folder's type are created.
    Create,
}

impl PathKind {
    /// Trailing segments to strip from the attribute-container template when
    /// a node stores no explicit template for this kind.
    const fn derived_strip_count(self) -> usize {
        match self {
            PathKind::Attributes | PathKind::Subfolders => 0,
            PathKind::List | PathKind::Create => 1,
        }
    }

    /// Only the attribute path must come out fully concrete; the other kinds
    /// may leave an unbound terminal placeholder in place.
    const fn requires_complete_path(self) -> bool {
        matches!(self, PathKind::Attributes)
    }
}

/// Resolution engine over a versioned, mode-qualified schema knowledge base.
///
/// An engine is bound to one (version, mode) pair for its whole lifetime;
/// composed categories are cached at most once each and shared read-only.
/// Composition failures are permanent for the instance: construct a new
/// engine after fixing the definitions.
pub struct SchemaEngine {
    source: Box<dyn CategorySource>,
    mode: Mode,
    version: ModelVersion,
    root_category: String,
    categories: BTreeSet<String>,
    cache: Mutex<CategoryCache>,
}

impl SchemaEngine {
    pub fn new(source: Box<dyn CategorySource>, mode: Mode, version: ModelVersion) -> Result<Self> {
        let categories: BTreeSet<String> = source.category_names()?.into_iter().collect();
        let root_category = source.root_category().to_string();
        if !categories.contains(&root_category) {
            return Err(SchemaError::UnknownCategory {
                name: root_category,
            });
        }
        debug!(%mode, version = %version, categories = categories.len(), "schema engine ready");
        Ok(Self {
            source,
            mode,
            version,
            root_category,
            categories,
            cache: Mutex::new(CategoryCache::default()),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn version(&self) -> &ModelVersion {
        &self.version
    }

    /// Name token callers must bind for the implicit root location.
    pub fn root_name_token(&self) -> String {
        self.root_category.to_uppercase()
    }

    /// Top-level category names, root category excluded.
    pub fn top_level_folder_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|name| **name != self.root_category)
            .cloned()
            .collect()
    }

    /// Resolve the folder node for a location.
    ///
    /// Returns None only when the folder exists in the raw schema but was
    /// pruned by version filtering; an unknown folder name is an error.  With
    /// `resolve_tokens` set, the node's path templates have the location's
    /// name tokens substituted (unbound terminal placeholders stay in place).
    pub fn node_for_location(
        &self,
        location: &Location,
        resolve_tokens: bool,
    ) -> Result<Option<Arc<ResolvedFolder>>> {
        trace!(location = %location, resolve_tokens, "resolving node for location");
        let folders = location.folders();
        let category = match folders.first() {
            None => self.root_category.as_str(),
            Some(name) => {
                if !self.categories.contains(name) {
                    return Err(SchemaError::UnknownCategory { name: name.clone() });
                }
                name.as_str()
            }
        };

        let Some(mut node) = self.category_node(category)? else {
            return Ok(None);
        };

        let mut walked = format!("/{category}");
        for folder_name in folders.iter().skip(1) {
            if let Some(child) = node.folders.get(folder_name) {
                node = Arc::clone(child);
                walked.push('/');
                walked.push_str(folder_name);
            } else if node.unresolved_folders.contains_key(folder_name) {
                return Ok(None);
            } else {
                return Err(SchemaError::UnknownFolder {
                    name: folder_name.clone(),
                    path: walked,
                });
            }
        }

        if resolve_tokens {
            let mut resolved = (*node).clone();
            for template in resolved.api_paths.values_mut() {
                *template = replace_path_tokens(location, template, false)?;
            }
            return Ok(Some(Arc::new(resolved)));
        }
        Ok(Some(node))
    }

    /// Subfolder names resolved for this location; empty when the folder has
    /// none or is version-pruned.
    pub fn subfolder_names_for_location(&self, location: &Location) -> Result<Vec<String>> {
        Ok(match self.node_for_location(location, false)? {
            Some(node) => node.folders.keys().cloned().collect(),
            None => Vec::new(),
        })
    }

    /// Slash-delimited logical model path for a location, instance names
    /// interleaved from the location's name tokens.
    pub fn model_folder_path_for_location(&self, location: &Location) -> Result<String> {
        if location.is_empty() {
            return Ok(MODEL_ROOT_PATH.to_string());
        }

        let mut path = String::from(MODEL_ROOT_PATH);
        let mut walk = Location::new();
        let folders = location.folders();
        for (index, folder_name) in folders.iter().enumerate() {
            path.push_str(folder_name);
            path.push('/');
            walk.append_folder(folder_name.clone());

            if let Some(token) = self.name_token_for_location(&walk)? {
                if let Some(name) = location.name_for_token(&token) {
                    path.push_str(name);
                    path.push('/');
                } else if index + 1 != folders.len() {
                    return Err(SchemaError::MissingNameToken {
                        location: location.folder_path(),
                        token,
                    });
                }
            }
        }

        if path.len() > MODEL_ROOT_PATH.len() && path.ends_with('/') {
            path.pop();
        }
        Ok(path)
    }

    /// API path where the location's attributes are read and written.
    pub fn attribute_path_for_location(&self, location: &Location) -> Result<String> {
        self.api_path_for_location(location, PathKind::Attributes)
    }

    /// API path where the location's subfolders are found.
    pub fn subfolders_path_for_location(&self, location: &Location) -> Result<String> {
        self.api_path_for_location(location, PathKind::Subfolders)
    }

    /// API path where existing instances of the location's type are listed.
    pub fn list_path_for_location(&self, location: &Location) -> Result<String> {
        self.api_path_for_location(location, PathKind::List)
    }

    /// API path where new instances of the location's type are created.
    pub fn create_path_for_location(&self, location: &Location) -> Result<String> {
        self.api_path_for_location(location, PathKind::Create)
    }

    pub fn api_path_for_location(&self, location: &Location, kind: PathKind) -> Result<String> {
        let template = self.tokenized_path_for_location(location, kind)?;
        replace_path_tokens(location, &template, kind.requires_complete_path())
    }

    /// Does the location sit on a folder flattened out of the logical model?
    pub fn location_has_flattened_folder(&self, location: &Location) -> Result<bool> {
        Ok(self
            .node_for_location(location, false)?
            .is_some_and(|node| node.flattened.is_some()))
    }

    /// API type of the flattened folder at this location, if any.
    pub fn flattened_type_for_location(&self, location: &Location) -> Result<Option<String>> {
        Ok(self
            .node_for_location(location, false)?
            .and_then(|node| node.flattened.as_ref().map(|data| data.api_type.clone())))
    }

    /// Instance name of the flattened folder, resolved through the location's
    /// name tokens.
    pub fn flattened_name_for_location(&self, location: &Location) -> Result<Option<String>> {
        match self.node_for_location(location, false)? {
            Some(node) => match &node.flattened {
                Some(data) => Ok(Some(token_value(location, &data.name_value)?)),
                None => Ok(None),
            },
            None => Ok(None),
        }
    }

    /// List path for the logical child of a flattened folder: the create path
    /// with the synthetic flattening layer stripped.
    pub fn flattened_list_path_for_location(&self, location: &Location) -> Result<String> {
        let template = self.tokenized_path_for_location(location, PathKind::Create)?;
        replace_path_tokens(location, &strip_trailing_segments(&template, 1), false)
    }

    /// Create path beneath a flattened folder: two synthetic trailing
    /// segments stripped from the create path.
    pub fn flattened_create_path_for_location(&self, location: &Location) -> Result<String> {
        let template = self.tokenized_path_for_location(location, PathKind::Create)?;
        replace_path_tokens(location, &strip_trailing_segments(&template, 2), false)
    }

    /// Name token a caller must bind for this location, or None when the
    /// location needs no new token (or is version-pruned).
    ///
    /// The token is the terminal `%TOKEN%` segment of the attribute-container
    /// template, provided that token occurs exactly once in the template.
    pub fn name_token_for_location(&self, location: &Location) -> Result<Option<String>> {
        if location.is_empty() {
            return Ok(Some(self.root_name_token()));
        }
        let Some(node) = self.node_for_location(location, false)? else {
            return Ok(None);
        };
        // A resolvable location must carry an addressable type.
        self.require_api_type(&node, location)?;

        let template = self.attribute_template(&node, location)?;
        let last_segment = template.rsplit('/').next().unwrap_or("");
        if let Some(token) = whole_value_token(last_segment) {
            if count_token_occurrences(last_segment, template) == 1 {
                return Ok(Some(token.to_string()));
            }
        }
        Ok(None)
    }

    /// Concrete instance name the management API uses for this location.
    pub fn instance_name_for_location(&self, location: &Location) -> Result<String> {
        let node = self.require_node(location)?;
        let name = match &node.default_name_value {
            Some(default_name) => default_name.clone(),
            None => {
                let template = self.attribute_template(&node, location)?;
                template.rsplit('/').next().unwrap_or("").to_string()
            }
        };
        token_value(location, &name)
    }

    /// API type identifier for this location; None when the folder was pruned
    /// by version filtering.
    pub fn api_type_for_location(&self, location: &Location) -> Result<Option<String>> {
        match self.node_for_location(location, false)? {
            Some(node) => Ok(Some(self.require_api_type(&node, location)?)),
            None => Ok(None),
        }
    }

    /// Does the location's folder have the requested child-folders type?
    ///
    /// Requesting instance children of a `none`-typed folder is a usage
    /// error; a version-pruned folder simply answers false.
    pub fn location_has_child_folders_type(
        &self,
        location: &Location,
        requested: ChildFoldersType,
    ) -> Result<bool> {
        let Some(node) = self.node_for_location(location, false)? else {
            return Ok(false);
        };
        if node.child_folders_type == requested {
            Ok(true)
        } else if node.child_folders_type == ChildFoldersType::None {
            Err(SchemaError::NoChildFolders {
                path: location.folder_path(),
                requested: requested.to_string(),
            })
        } else {
            Ok(false)
        }
    }

    /// All attribute entries for a location, keyed by model name.  Handoff
    /// copies carry no internal path key.
    pub fn attribute_entries_for_location(
        &self,
        location: &Location,
    ) -> Result<BTreeMap<String, ResolvedAttribute>> {
        let node = self.require_node(location)?;
        let attributes = self.require_attributes(&node, location)?;
        Ok(attributes
            .by_model_name
            .iter()
            .map(|(name, attribute)| (name.clone(), attribute.handoff_copy()))
            .collect())
    }

    /// Single attribute entry by its model name; None when the folder has no
    /// such attribute.
    pub fn attribute_entry_by_model_name(
        &self,
        location: &Location,
        model_name: &str,
    ) -> Result<Option<ResolvedAttribute>> {
        let node = self.require_node(location)?;
        let attributes = self.require_attributes(&node, location)?;
        Ok(attributes
            .by_model_name
            .get(model_name)
            .map(ResolvedAttribute::handoff_copy))
    }

    /// Single attribute entry by its external API name.
    ///
    /// Skip-listed and ignored bookkeeping names answer None; any other
    /// unknown name is a usage error.
    pub fn attribute_entry_by_api_name(
        &self,
        location: &Location,
        api_name: &str,
    ) -> Result<Option<ResolvedAttribute>> {
        let node = self.require_node(location)?;
        let attributes = self.require_attributes(&node, location)?;
        if attributes.skip_names.contains(api_name) {
            return Ok(None);
        }
        if let Some(attribute) = attributes.by_api_name.get(api_name) {
            return Ok(Some(attribute.handoff_copy()));
        }
        if IGNORED_API_NAMES.contains(&api_name) {
            return Ok(None);
        }
        Err(SchemaError::UnknownAttribute {
            name: api_name.to_string(),
            path: location.folder_path(),
        })
    }

    /// Version range of a pruned top-level category, once composition has
    /// been attempted.
    pub(crate) fn top_level_unresolved_range(&self, category: &str) -> Option<String> {
        self.lock_cache().unresolved.get(category).cloned()
    }

    pub(crate) fn is_top_level_folder(&self, name: &str) -> bool {
        name != self.root_category && self.categories.contains(name)
    }

    /// Valid range of the shallowest version-pruned folder on the location's
    /// path.  Only meaningful when the location itself failed to resolve.
    pub(crate) fn valid_version_range_for_folder(&self, location: &Location) -> Result<String> {
        let folders = location.folders();
        let Some(category) = folders.first() else {
            return Err(SchemaError::ValidRangeUnavailable {
                path: location.folder_path(),
                version: self.version.to_string(),
            });
        };

        let mut walked = format!("/{category}");
        let mut node = match self.category_node(category)? {
            Some(node) => node,
            None => {
                return self.top_level_unresolved_range(category).ok_or_else(|| {
                    SchemaError::UnknownFolder {
                        name: category.clone(),
                        path: "/".to_string(),
                    }
                });
            }
        };

        for folder_name in folders.iter().skip(1) {
            if let Some(range) = node.unresolved_folders.get(folder_name) {
                return Ok(range.clone());
            }
            match node.folders.get(folder_name) {
                Some(child) => {
                    node = Arc::clone(child);
                    walked.push('/');
                    walked.push_str(folder_name);
                }
                None => {
                    return Err(SchemaError::UnknownFolder {
                        name: folder_name.clone(),
                        path: walked,
                    });
                }
            }
        }

        Err(SchemaError::ValidRangeUnavailable {
            path: location.folder_path(),
            version: self.version.to_string(),
        })
    }

    fn category_node(&self, name: &str) -> Result<Option<Arc<ResolvedFolder>>> {
        let mut cache = self.lock_cache();
        if let Some(entry) = cache.resolved.get(name) {
            return Ok(entry.clone());
        }
        // First access composes under the cache lock, serializing composition
        // per engine; afterwards the entry is read-only.
        let composed = compose_category(
            self.source.as_ref(),
            &self.categories,
            self.mode,
            &self.version,
            name,
            &mut cache.unresolved,
        )?;
        cache.resolved.insert(name.to_string(), composed.clone());
        Ok(composed)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, CategoryCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn require_node(&self, location: &Location) -> Result<Arc<ResolvedFolder>> {
        self.node_for_location(location, false)?
            .ok_or_else(|| SchemaError::FolderNotInVersion {
                path: location.folder_path(),
                version: self.version.to_string(),
            })
    }

    fn require_api_type(&self, node: &ResolvedFolder, location: &Location) -> Result<String> {
        node.api_type
            .clone()
            .ok_or_else(|| SchemaError::MissingEntry {
                path: location.folder_path(),
                key: "api_type".to_string(),
            })
    }

    fn require_attributes<'a>(
        &self,
        node: &'a ResolvedFolder,
        location: &Location,
    ) -> Result<&'a crate::model::resolved::FolderAttributes> {
        node.attributes
            .as_ref()
            .ok_or_else(|| SchemaError::MissingEntry {
                path: location.folder_path(),
                key: "attributes".to_string(),
            })
    }

    /// Tokenized template for a path kind: the node's stored template when
    /// present, otherwise derived from the attribute-container template by
    /// the kind's strip count.
    fn tokenized_path_for_location(&self, location: &Location, kind: PathKind) -> Result<String> {
        let node = self.require_node(location)?;
        let stored_key = match kind {
            PathKind::Attributes => node.attributes_path.as_deref(),
            PathKind::Subfolders => node.subfolders_path.as_deref(),
            PathKind::List => node.list_path.as_deref(),
            PathKind::Create => node.create_path.as_deref(),
        };
        if let Some(key) = stored_key {
            return Ok(self.path_template(&node, location, key)?.to_string());
        }
        let template = self.attribute_template(&node, location)?;
        Ok(strip_trailing_segments(template, kind.derived_strip_count()))
    }

    fn attribute_template<'a>(
        &self,
        node: &'a ResolvedFolder,
        location: &Location,
    ) -> Result<&'a str> {
        let key = node
            .attributes_path
            .as_deref()
            .ok_or_else(|| SchemaError::MissingEntry {
                path: location.folder_path(),
                key: "attributes_path".to_string(),
            })?;
        self.path_template(node, location, key)
    }

    fn path_template<'a>(
        &self,
        node: &'a ResolvedFolder,
        location: &Location,
        key: &str,
    ) -> Result<&'a str> {
        node.api_paths
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| SchemaError::UnknownPathKey {
                path: location.folder_path(),
                key: key.to_string(),
            })
    }
}
