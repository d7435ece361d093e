pub mod error;
pub mod model;
pub mod resolver;

pub use error::{Result, SchemaError};
pub use model::location::Location;
pub use model::resolved::{ChildFoldersType, ResolvedAttribute, ResolvedFolder};
pub use model::store::{CategorySource, SourceError, StaticCategorySource, YamlDirectorySource};
pub use resolver::engine::SchemaEngine;
pub use resolver::validation::{LocationValidation, NameValidation, ValidationCode};
pub use resolver::version::{Mode, ModelVersion, VersionError};
