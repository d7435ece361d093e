//! Schema data types: raw category definitions, resolved folder trees, the
//! location context used to address folders, and the raw-definition source
//! abstraction.

pub mod category;
pub mod location;
pub mod resolved;
pub mod store;

pub use category::{RawAttributeVariant, RawFlattenedFolder, RawFolder};
pub use location::Location;
pub use resolved::{
    ChildFoldersType, FlattenedFolderData, FolderAttributes, ResolvedAttribute, ResolvedFolder,
};
pub use store::{CategorySource, SourceError, StaticCategorySource, YamlDirectorySource};
