// Definition composer - inlining and version/mode filtering
// Turns a raw category document into a resolved folder tree specific to one
// (version, mode) pair.  Composition is all-or-nothing per category: any
// malformed definition aborts with a schema error.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};
use crate::model::category::{RawAttributeVariant, RawFolder};
use crate::model::resolved::{
    FlattenedFolderData, FolderAttributes, ResolvedAttribute, ResolvedFolder,
};
use crate::model::store::CategorySource;
use crate::resolver::version::{is_version_in_range, Mode, ModelVersion, VariantMode};

/// Per-engine cache of composed categories.
///
/// `resolved` holds the compose-once output per category name (None when the
/// whole category was pruned by version filtering); `unresolved` records the
/// valid version range of pruned top-level categories.
#[derive(Debug, Default)]
pub(crate) struct CategoryCache {
    pub(crate) resolved: BTreeMap<String, Option<Arc<ResolvedFolder>>>,
    pub(crate) unresolved: BTreeMap<String, String>,
}

/// Compose one top-level category: load, inline category references, then
/// filter by version and mode.  A category pruned at the top level records
/// its range in `top_level_unresolved` and yields None.
pub(crate) fn compose_category(
    source: &dyn CategorySource,
    categories: &BTreeSet<String>,
    mode: Mode,
    version: &ModelVersion,
    name: &str,
    top_level_unresolved: &mut BTreeMap<String, String>,
) -> Result<Option<Arc<ResolvedFolder>>> {
    debug!(category = name, %mode, version = %version, "composing category");
    let mut raw = source.load_category(name)?;

    let mut visiting = BTreeSet::new();
    visiting.insert(name.to_string());
    inline_references(source, categories, name, &mut raw, "", &mut visiting)?;

    let resolved = filter_folder(
        &format!("/{name}"),
        raw,
        mode,
        version,
        top_level_unresolved,
    )?;
    Ok(resolved.map(Arc::new))
}

/// Inlining pass: prefix this node's path templates with `base_path`, recurse
/// into child folders, then splice every referenced category into the child
/// folder map at a prefix computed from this node's own attribute template.
fn inline_references(
    source: &dyn CategorySource,
    categories: &BTreeSet<String>,
    category: &str,
    node: &mut RawFolder,
    base_path: &str,
    visiting: &mut BTreeSet<String>,
) -> Result<()> {
    if !base_path.is_empty() {
        for template in node.api_paths.values_mut() {
            *template = format!("{base_path}{template}");
        }
    }

    for (folder_name, folder) in node.folders.iter_mut() {
        inline_references(source, categories, folder_name, folder, base_path, visiting)?;
    }

    if node.contains.is_empty() {
        return Ok(());
    }

    let new_base_path = compute_base_path(category, node)?;
    for reference in std::mem::take(&mut node.contains) {
        if !categories.contains(&reference) {
            return Err(SchemaError::UnknownCategoryReference {
                reference,
                category: category.to_string(),
            });
        }
        if !visiting.insert(reference.clone()) {
            return Err(SchemaError::CategoryReferenceCycle {
                category: reference,
            });
        }
        trace!(category, reference = %reference, base_path = %new_base_path, "inlining category reference");
        let mut referenced = source.load_category(&reference)?;
        inline_references(
            source,
            categories,
            &reference,
            &mut referenced,
            &new_base_path,
            visiting,
        )?;
        visiting.remove(&reference);
        node.folders.insert(reference, referenced);
    }
    Ok(())
}

/// Prefix for paths inlined under `node`: the node's own attribute-container
/// template, without its trailing slash so the root template contributes no
/// prefix.
fn compute_base_path(category: &str, node: &RawFolder) -> Result<String> {
    let key = node
        .attributes_path
        .as_deref()
        .ok_or_else(|| SchemaError::MissingEntry {
            path: format!("/{category}"),
            key: "attributes_path".to_string(),
        })?;
    let template = node
        .api_paths
        .get(key)
        .ok_or_else(|| SchemaError::UnknownPathKey {
            path: format!("/{category}"),
            key: key.to_string(),
        })?;
    Ok(template.trim_end_matches('/').to_string())
}

/// Filtering pass: prune the node when its version range excludes the active
/// version (recording name and range in the parent's unresolved map), then
/// resolve mode markers and attribute variants depth-first.
fn filter_folder(
    path: &str,
    raw: RawFolder,
    mode: Mode,
    version: &ModelVersion,
    parent_unresolved: &mut BTreeMap<String, String>,
) -> Result<Option<ResolvedFolder>> {
    if let Some(range) = &raw.version {
        let in_range =
            is_version_in_range(version, range).map_err(|source| SchemaError::InvalidVersionRange {
                range: range.clone(),
                path: path.to_string(),
                source,
            })?;
        if !in_range {
            debug!(folder = path, range = %range, version = %version, "folder pruned by version");
            parent_unresolved.insert(folder_name_from_path(path).to_string(), range.clone());
            return Ok(None);
        }
    }

    if raw.api_paths.is_empty() {
        return Err(SchemaError::MissingEntry {
            path: path.to_string(),
            key: "api_paths".to_string(),
        });
    }

    let mut node = ResolvedFolder {
        child_folders_type: raw.child_folders_type.unwrap_or_default(),
        attributes_path: raw.attributes_path,
        subfolders_path: raw.subfolders_path,
        list_path: raw.list_path,
        create_path: raw.create_path,
        ..ResolvedFolder::default()
    };

    for (folder_name, folder) in raw.folders {
        let child_path = format!("{path}/{folder_name}");
        if let Some(child) =
            filter_folder(&child_path, folder, mode, version, &mut node.unresolved_folders)?
        {
            node.folders.insert(folder_name, Arc::new(child));
        }
    }

    for (key, template) in raw.api_paths {
        let resolved = resolve_mode_value(path, &template, mode)?;
        node.api_paths.insert(key, resolved);
    }

    if let Some(api_type) = raw.api_type {
        node.api_type = Some(resolve_mode_value(path, &api_type, mode)?);
    }
    if let Some(default_name) = raw.default_name_value {
        node.default_name_value = Some(resolve_mode_value(path, &default_name, mode)?);
    }
    if let Some(flattened) = raw.flattened_folder_data {
        node.flattened = Some(FlattenedFolderData {
            api_type: resolve_mode_value(path, &flattened.api_type, mode)?,
            name_value: resolve_mode_value(path, &flattened.name_value, mode)?,
        });
    }

    if !raw.attributes.is_empty() {
        let mut attributes = FolderAttributes::default();
        for (attr_name, variants) in raw.attributes {
            match resolve_attribute(path, &attr_name, &variants, mode, version)? {
                AttributeOutcome::Matched { attribute, skip_name } => {
                    attributes
                        .by_api_name
                        .insert(attribute.api_name.clone(), attribute.clone());
                    attributes.by_model_name.insert(attr_name, attribute);
                    if let Some(skip_name) = skip_name {
                        attributes.skip_names.insert(skip_name);
                    }
                }
                AttributeOutcome::Unmatched { valid_range } => {
                    trace!(
                        folder = path,
                        attribute = %attr_name,
                        range = valid_range.as_deref(),
                        "attribute has no variant for the active version"
                    );
                    attributes.unresolved.insert(attr_name, valid_range);
                }
            }
        }
        node.attributes = Some(attributes);
    }

    Ok(Some(node))
}

#[derive(Debug)]
enum AttributeOutcome {
    Matched {
        attribute: ResolvedAttribute,
        skip_name: Option<String>,
    },
    Unmatched {
        valid_range: Option<String>,
    },
}

/// Walk an attribute's variant list and find the single entry that applies to
/// the active (version, mode) pair.  Zero matches is a normal outcome; more
/// than one is a malformed variant list.
fn resolve_attribute(
    path: &str,
    attr_name: &str,
    variants: &[RawAttributeVariant],
    mode: Mode,
    version: &ModelVersion,
) -> Result<AttributeOutcome> {
    let mut ranges_by_mode: BTreeMap<Mode, Vec<String>> = BTreeMap::new();
    let mut matches: Vec<&RawAttributeVariant> = Vec::new();

    for variant in variants {
        let mode_text = variant
            .mode
            .as_deref()
            .ok_or_else(|| SchemaError::VariantMissingMode {
                name: attr_name.to_string(),
                path: path.to_string(),
            })?;
        let variant_mode =
            VariantMode::from_str(mode_text).map_err(|_| SchemaError::InvalidVariantMode {
                name: attr_name.to_string(),
                path: path.to_string(),
                mode: mode_text.to_string(),
            })?;
        let range = variant
            .version
            .as_deref()
            .ok_or_else(|| SchemaError::VariantMissingVersion {
                name: attr_name.to_string(),
                path: path.to_string(),
            })?;

        for recorded_mode in [Mode::Offline, Mode::Online] {
            if variant_mode.matches(recorded_mode) {
                ranges_by_mode
                    .entry(recorded_mode)
                    .or_default()
                    .push(range.to_string());
            }
        }

        if !variant_mode.matches(mode) {
            continue;
        }
        let in_range =
            is_version_in_range(version, range).map_err(|source| SchemaError::InvalidVersionRange {
                range: range.to_string(),
                path: format!("{path}/{attr_name}"),
                source,
            })?;
        if in_range {
            matches.push(variant);
        }
    }

    match matches.len() {
        0 => Ok(AttributeOutcome::Unmatched {
            valid_range: ranges_by_mode.get(&mode).map(|ranges| ranges.join(",")),
        }),
        1 => {
            let (attribute, skip_name) = build_attribute(path, attr_name, matches[0], mode)?;
            Ok(AttributeOutcome::Matched {
                attribute,
                skip_name,
            })
        }
        _ => Err(SchemaError::OverlappingVariants {
            name: attr_name.to_string(),
            path: path.to_string(),
            version: version.to_string(),
            mode: mode.to_string(),
        }),
    }
}

/// Resolve a matched variant's fields for the active mode.  Empty accessor
/// metadata strings are dropped rather than carried through.
fn build_attribute(
    path: &str,
    attr_name: &str,
    variant: &RawAttributeVariant,
    mode: Mode,
) -> Result<(ResolvedAttribute, Option<String>)> {
    let resolve = |value: &Option<String>| -> Result<Option<String>> {
        match value {
            Some(value) => Ok(Some(resolve_mode_value(path, value, mode)?)),
            None => Ok(None),
        }
    };
    let resolve_accessor = |value: &Option<String>| -> Result<Option<String>> {
        Ok(resolve(value)?.filter(|value| !value.is_empty()))
    };

    let api_name = resolve(&variant.api_name)?.ok_or_else(|| SchemaError::VariantMissingApiName {
        name: attr_name.to_string(),
        path: path.to_string(),
    })?;

    let attribute = ResolvedAttribute {
        model_name: attr_name.to_string(),
        api_name,
        api_path: resolve(&variant.api_path)?,
        value_type: resolve(&variant.value_type)?,
        default_value: resolve(&variant.default_value)?,
        get_method: resolve_accessor(&variant.get_method)?,
        set_method: resolve_accessor(&variant.set_method)?,
        get_type: resolve_accessor(&variant.get_type)?,
        set_type: resolve_accessor(&variant.set_type)?,
    };
    let skip_name = resolve(&variant.skip_api_name)?.filter(|name| !name.is_empty());
    Ok((attribute, skip_name))
}

/// Select the branch of every `${offline|online}` marker embedded in a value.
fn resolve_mode_value(path: &str, value: &str, mode: Mode) -> Result<String> {
    let mut resolved = value.to_string();
    while let Some(start) = resolved.find("${") {
        let malformed = || SchemaError::MalformedModeMarker {
            value: value.to_string(),
            path: path.to_string(),
        };
        let rest = &resolved[start + 2..];
        let end = rest.find('}').ok_or_else(malformed)?;
        let inner = &rest[..end];
        let (offline, online) = inner.split_once('|').ok_or_else(malformed)?;
        let selected = match mode {
            Mode::Offline => offline,
            Mode::Online => online,
        };
        resolved = format!(
            "{}{}{}",
            &resolved[..start],
            selected,
            &rest[end + 1..]
        );
    }
    Ok(resolved)
}

fn folder_name_from_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
