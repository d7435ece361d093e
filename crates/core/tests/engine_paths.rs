mod common;

use common::{engine, location};
use modelmap_core::{Mode, SchemaError};

fn server_location(name: &str) -> modelmap_core::Location {
    let mut location = location(&["Server"]);
    location.add_name_token("SERVER", name);
    location
}

#[test]
fn attribute_path_substitutes_bound_name_tokens() {
    let engine = engine(Mode::Offline, "12.2.1");
    let path = engine
        .attribute_path_for_location(&server_location("AdminServer"))
        .unwrap();
    assert_eq!(path, "/Server/AdminServer");
}

#[test]
fn attribute_path_requires_every_token_bound() {
    let engine = engine(Mode::Offline, "12.2.1");
    let error = engine
        .attribute_path_for_location(&location(&["Server"]))
        .unwrap_err();
    assert!(matches!(error, SchemaError::MissingNameToken { .. }));
}

#[test]
fn subfolders_path_tolerates_an_unbound_terminal_token() {
    let engine = engine(Mode::Offline, "12.2.1");
    let path = engine
        .subfolders_path_for_location(&location(&["Server"]))
        .unwrap();
    assert_eq!(path, "/Server/%SERVER%");
}

#[test]
fn list_and_create_paths_derive_from_the_attribute_template() {
    let engine = engine(Mode::Offline, "12.2.1");
    let base = location(&["Server"]);
    assert_eq!(engine.list_path_for_location(&base).unwrap(), "/Server");
    assert_eq!(engine.create_path_for_location(&base).unwrap(), "/Server");
}

#[test]
fn stored_create_path_wins_over_the_derived_one() {
    let engine = engine(Mode::Offline, "12.2.1");
    let mut ssl = location(&["Server", "Ssl"]);
    ssl.add_name_token("SERVER", "AdminServer");
    assert_eq!(
        engine.create_path_for_location(&ssl).unwrap(),
        "/Server/AdminServer/SSL"
    );
}

#[test]
fn flattened_folder_queries() {
    let engine = engine(Mode::Offline, "12.2.1");
    let mut ssl = location(&["Server", "Ssl"]);
    ssl.add_name_token("SERVER", "AdminServer");

    assert!(engine.location_has_flattened_folder(&ssl).unwrap());
    assert_eq!(
        engine.flattened_type_for_location(&ssl).unwrap().as_deref(),
        Some("SSL")
    );
    assert_eq!(
        engine.flattened_name_for_location(&ssl).unwrap().as_deref(),
        Some("AdminServer")
    );
    assert_eq!(
        engine.flattened_list_path_for_location(&ssl).unwrap(),
        "/Server/AdminServer"
    );
    assert_eq!(
        engine.flattened_create_path_for_location(&ssl).unwrap(),
        "/Server"
    );

    let server = server_location("AdminServer");
    assert!(!engine.location_has_flattened_folder(&server).unwrap());
    assert_eq!(engine.flattened_type_for_location(&server).unwrap(), None);
}

#[test]
fn name_token_is_the_terminal_template_placeholder() {
    let engine = engine(Mode::Offline, "12.2.1");
    assert_eq!(
        engine.name_token_for_location(&location(&["Server"])).unwrap(),
        Some("SERVER".to_string())
    );
    // /Server/%SERVER%/Log/%SERVER% repeats the placeholder, so Log carries
    // no token of its own.
    assert_eq!(
        engine
            .name_token_for_location(&location(&["Server", "Log"]))
            .unwrap(),
        None
    );
}

#[test]
fn root_location_uses_the_root_category_token() {
    let engine = engine(Mode::Offline, "12.2.1");
    let root = location(&[]);
    assert_eq!(
        engine.name_token_for_location(&root).unwrap(),
        Some("DOMAIN".to_string())
    );
    assert_eq!(
        engine.model_folder_path_for_location(&root).unwrap(),
        "model:/"
    );
}

#[test]
fn model_folder_path_interleaves_instance_names() {
    let engine = engine(Mode::Offline, "12.2.1");
    let mut log = location(&["Server", "Log"]);
    log.add_name_token("SERVER", "AdminServer");
    assert_eq!(
        engine.model_folder_path_for_location(&log).unwrap(),
        "model:/Server/AdminServer/Log"
    );
}

#[test]
fn instance_name_prefers_the_default_name_value() {
    let engine = engine(Mode::Offline, "12.2.1");
    let mut ssl = location(&["Server", "Ssl"]);
    ssl.add_name_token("SERVER", "AdminServer");
    assert_eq!(engine.instance_name_for_location(&ssl).unwrap(), "AdminServer");

    let mut log = location(&["Server", "Log"]);
    log.add_name_token("SERVER", "AdminServer");
    assert_eq!(engine.instance_name_for_location(&log).unwrap(), "AdminServer");
}

#[test]
fn api_type_resolves_mode_markers() {
    let offline = engine(Mode::Offline, "12.2.1");
    let online = engine(Mode::Online, "12.2.1");
    let cluster = location(&["Cluster"]);
    assert_eq!(
        offline.api_type_for_location(&cluster).unwrap().as_deref(),
        Some("ClusterConfig")
    );
    assert_eq!(
        online.api_type_for_location(&cluster).unwrap().as_deref(),
        Some("Cluster")
    );
}

#[test]
fn subfolder_names_list_only_resolved_children() {
    let engine = engine(Mode::Offline, "12.1.3");
    let names = engine
        .subfolder_names_for_location(&location(&["Server"]))
        .unwrap();
    // Channel needs 12.2.1 or later.
    assert_eq!(names, vec!["Log".to_string(), "Ssl".to_string()]);
}

#[test]
fn top_level_folder_names_exclude_the_root_category() {
    let engine = engine(Mode::Offline, "12.2.1");
    let names = engine.top_level_folder_names();
    assert!(names.contains(&"Server".to_string()));
    assert!(names.contains(&"Machine".to_string()));
    assert!(!names.contains(&"Domain".to_string()));
}

#[test]
fn inlined_category_paths_are_prefixed_with_the_parent_template() {
    let engine = engine(Mode::Offline, "12.2.1");
    let mut sub = location(&["Resource", "SubResource"]);
    sub.add_name_token("RESOURCE", "R1");
    sub.add_name_token("SUBRESOURCE", "S1");
    assert_eq!(
        engine.attribute_path_for_location(&sub).unwrap(),
        "/Resource/R1/SubResource/S1"
    );
}

#[test]
fn unknown_names_are_hard_errors() {
    let engine = engine(Mode::Offline, "12.2.1");
    assert!(matches!(
        engine.node_for_location(&location(&["Bogus"]), false),
        Err(SchemaError::UnknownCategory { .. })
    ));
    assert!(matches!(
        engine.node_for_location(&location(&["Server", "Bogus"]), false),
        Err(SchemaError::UnknownFolder { .. })
    ));
}
