use thiserror::Error;

use crate::model::store::SourceError;
use crate::resolver::version::VersionError;

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Failures raised while composing or querying the schema knowledge base.
///
/// Schema/configuration variants (malformed definitions, overlapping variant
/// ranges, unknown category references) are non-recoverable for the engine
/// instance.  Usage variants (unknown folder, missing name token) are fatal to
/// the calling operation only.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("'{name}' is not a known top-level category")]
    UnknownCategory { name: String },

    #[error("folder '{name}' does not exist under '{path}'")]
    UnknownFolder { name: String, path: String },

    #[error("attribute '{name}' is not defined for folder '{path}'")]
    UnknownAttribute { name: String, path: String },

    #[error("location '{location}' has no value for name token '{token}'")]
    MissingNameToken { location: String, token: String },

    #[error("folder '{path}' is missing required entry '{key}'")]
    MissingEntry { path: String, key: String },

    #[error("folder '{path}' has no api_paths entry for key '{key}'")]
    UnknownPathKey { path: String, key: String },

    #[error("attribute '{name}' at '{path}' has a variant with no mode")]
    VariantMissingMode { name: String, path: String },

    #[error("attribute '{name}' at '{path}' has a variant with no version range")]
    VariantMissingVersion { name: String, path: String },

    #[error("attribute '{name}' at '{path}' has an invalid variant mode '{mode}'")]
    InvalidVariantMode {
        name: String,
        path: String,
        mode: String,
    },

    #[error("attribute '{name}' at '{path}' resolved to a variant with no api_name")]
    VariantMissingApiName { name: String, path: String },

    #[error(
        "attribute '{name}' at '{path}' matches more than one variant \
         for version {version} in {mode} mode"
    )]
    OverlappingVariants {
        name: String,
        path: String,
        version: String,
        mode: String,
    },

    #[error("category reference '{reference}' in '{category}' is not a known category")]
    UnknownCategoryReference { reference: String, category: String },

    #[error("category reference cycle detected: '{category}' is already being inlined")]
    CategoryReferenceCycle { category: String },

    #[error("invalid version range '{range}' at '{path}'")]
    InvalidVersionRange {
        range: String,
        path: String,
        #[source]
        source: VersionError,
    },

    #[error("malformed mode marker in value '{value}' at '{path}'")]
    MalformedModeMarker { value: String, path: String },

    #[error("folder '{path}' has child folder type 'none' and cannot hold '{requested}' children")]
    NoChildFolders { path: String, requested: String },

    #[error("folder '{path}' is not part of the schema for version {version}")]
    FolderNotInVersion { path: String, version: String },

    #[error("no version-filtered folder found on path '{path}' for version {version}")]
    ValidRangeUnavailable { path: String, version: String },
}
