mod common;

use common::{engine, location};
use modelmap_core::{Mode, SchemaError};

#[test]
fn entries_map_covers_resolved_attributes_only() {
    let engine = engine(Mode::Offline, "12.2.1");
    let entries = engine
        .attribute_entries_for_location(&location(&["Server"]))
        .unwrap();

    assert!(entries.contains_key("ListenPort"));
    assert!(entries.contains_key("Password"));
    // Notes needs 14.1 or later.
    assert!(!entries.contains_key("Notes"));
}

#[test]
fn handoff_copies_carry_no_internal_path_key() {
    let engine = engine(Mode::Offline, "12.2.1");
    let server = location(&["Server"]);

    let entries = engine.attribute_entries_for_location(&server).unwrap();
    assert!(entries.values().all(|entry| entry.api_path.is_none()));

    let entry = engine
        .attribute_entry_by_model_name(&server, "ListenPort")
        .unwrap()
        .expect("ListenPort entry");
    assert_eq!(entry.api_path, None);
    assert_eq!(entry.value_type.as_deref(), Some("integer"));
    assert_eq!(entry.default_value.as_deref(), Some("7001"));
}

#[test]
fn api_name_lookup_honors_the_skip_list() {
    let engine = engine(Mode::Offline, "12.2.1");
    let server = location(&["Server"]);

    // Offline resolves Password to PasswordEncrypted and suppresses the
    // plain-text name entirely.
    assert!(engine
        .attribute_entry_by_api_name(&server, "Password")
        .unwrap()
        .is_none());
    let entry = engine
        .attribute_entry_by_api_name(&server, "PasswordEncrypted")
        .unwrap()
        .expect("encrypted password entry");
    assert_eq!(entry.model_name, "Password");
}

#[test]
fn bookkeeping_api_names_are_silently_absent() {
    let engine = engine(Mode::Offline, "12.2.1");
    let server = location(&["Server"]);
    for name in ["DynamicallyCreated", "Id", "Name", "Tag", "Tags", "Type"] {
        assert!(
            engine
                .attribute_entry_by_api_name(&server, name)
                .unwrap()
                .is_none(),
            "{name} should be silently absent"
        );
    }
}

#[test]
fn unknown_api_name_is_a_hard_error() {
    let engine = engine(Mode::Offline, "12.2.1");
    let error = engine
        .attribute_entry_by_api_name(&location(&["Server"]), "Bogus")
        .unwrap_err();
    assert!(matches!(error, SchemaError::UnknownAttribute { .. }));
}

#[test]
fn off_version_folder_rejects_attribute_queries() {
    let engine = engine(Mode::Offline, "12.1.3");
    let error = engine
        .attribute_entries_for_location(&location(&["Server", "Channel"]))
        .unwrap_err();
    assert!(matches!(error, SchemaError::FolderNotInVersion { .. }));
}
