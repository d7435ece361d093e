use std::path::PathBuf;

use modelmap_core::{Location, Mode, SchemaEngine, YamlDirectorySource};

#[allow(dead_code)]
pub fn categories_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("categories")
}

#[allow(dead_code)]
pub fn engine(mode: Mode, version: &str) -> SchemaEngine {
    let source = YamlDirectorySource::new(categories_dir(), "Domain");
    SchemaEngine::new(Box::new(source), mode, version.parse().expect("version should parse"))
        .expect("engine should build from fixtures")
}

#[allow(dead_code)]
pub fn location(folders: &[&str]) -> Location {
    Location::from_folders(folders.iter().copied())
}
