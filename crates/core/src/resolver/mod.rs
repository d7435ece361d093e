//! Schema composition and resolution engine.
//!
//! This module composes versioned category definitions into resolved folder
//! trees and answers location queries against them: path building, name
//! tokens, attribute entries, and tolerant name validation.
//!
//! # Example
//!
//! ```ignore
//! use modelmap_core::resolver::engine::SchemaEngine;
//! use modelmap_core::resolver::version::Mode;
//!
//! let engine = SchemaEngine::new(source, Mode::Offline, "14.1.1".parse()?)?;
//! let path = engine.attribute_path_for_location(&location)?;
//! ```
pub mod composer;
pub mod engine;
pub mod tokens;
pub mod validation;
pub mod version;

/// Resolver submodule identifier.
pub fn module_name() -> &'static str {
    "resolver"
}
