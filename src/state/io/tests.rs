use super::{CURRENT_STATE_SCHEMA_VERSION, FilesystemStateStore, load_state, save_state, state_file_path};
use crate::error::BblError;
use crate::state::types::State;
use crate::traits::StateStore;
use std::fs;
use tempfile::tempdir;

fn populated_state() -> State {
    let mut state = State::default();
    state.aws.region = "some-aws-region".to_string();
    state.key_pair.name = "some-ec2-key-pair-name".to_string();
    state.key_pair.private_key = "some-private-key".to_string();
    state.stack.name = "some-stack-name".to_string();
    state
        .bosh
        .state
        .insert("key".to_string(), serde_json::json!("value"));
    state
}

#[test]
fn load_missing_file_returns_state_not_found() {
    let dir = tempdir().expect("tempdir");
    let err = load_state(dir.path()).expect_err("missing file should fail");

    assert!(matches!(err, BblError::StateNotFound { .. }));
    let msg = err.to_string();
    assert!(msg.contains(&format!("bbl-state.json not found in {:?}", dir.path())));
    assert!(msg.contains("create a new environment with bbl up"));
}

#[test]
fn save_then_load_preserves_fields_and_stamps_version() {
    let dir = tempdir().expect("tempdir");
    let state = populated_state();

    save_state(dir.path(), &state).expect("save");
    let loaded = load_state(dir.path()).expect("load");

    assert_eq!(loaded.version, CURRENT_STATE_SCHEMA_VERSION);
    assert_eq!(loaded.stack, state.stack);
    assert_eq!(loaded.key_pair, state.key_pair);
    assert_eq!(loaded.bosh.state, state.bosh.state);
}

#[test]
fn save_leaves_no_temp_file_behind() {
    let dir = tempdir().expect("tempdir");
    save_state(dir.path(), &populated_state()).expect("save");

    let names: Vec<String> = fs::read_dir(dir.path())
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["bbl-state.json".to_string()]);
}

#[test]
fn save_creates_missing_state_directory() {
    let dir = tempdir().expect("tempdir");
    let nested = dir.path().join("envs").join("prod");

    save_state(&nested, &State::default()).expect("save");
    assert!(state_file_path(&nested).exists());
}

#[test]
fn empty_state_file_is_distinct_from_missing_file() {
    let dir = tempdir().expect("tempdir");
    fs::write(state_file_path(dir.path()), "{}").expect("write");

    let loaded = load_state(dir.path()).expect("empty document loads");
    assert!(loaded.is_empty());
}

#[test]
fn corrupted_state_file_names_the_file() {
    let dir = tempdir().expect("tempdir");
    let path = state_file_path(dir.path());
    fs::write(&path, "{broken json").expect("write");

    let err = load_state(dir.path()).expect_err("corrupted state should fail");
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempdir().expect("tempdir");
    fs::write(state_file_path(dir.path()), r#"{"version": 99}"#).expect("write");

    let err = load_state(dir.path()).expect_err("future version should fail");
    assert!(matches!(err, BblError::UnsupportedStateVersion { found: 99, .. }));
}

#[test]
fn failed_write_keeps_previous_state() {
    let dir = tempdir().expect("tempdir");
    let store = FilesystemStateStore::new(dir.path());
    store.save(&populated_state()).expect("first save");

    // A directory squatting on the temp path makes the next write fail.
    fs::create_dir(dir.path().join("bbl-state.json.tmp")).expect("block temp path");
    assert!(store.save(&State::default()).is_err());

    let loaded = store.load().expect("previous state still readable");
    assert_eq!(loaded.stack.name, "some-stack-name");
}

#[cfg(unix)]
#[test]
fn state_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().expect("tempdir");
    save_state(dir.path(), &populated_state()).expect("save");

    let mode = fs::metadata(state_file_path(dir.path()))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[cfg(unix)]
#[test]
fn stale_temp_file_does_not_leak_its_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().expect("tempdir");
    let tmp_path = dir.path().join("bbl-state.json.tmp");
    fs::write(&tmp_path, "partial").expect("write stale temp file");
    fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o644)).expect("chmod");

    save_state(dir.path(), &populated_state()).expect("save");

    assert!(!tmp_path.exists());
    let mode = fs::metadata(state_file_path(dir.path()))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(load_state(dir.path()).expect("load").stack.name, "some-stack-name");
}

#[test]
fn save_restamps_older_schema_version() {
    let dir = tempdir().expect("tempdir");
    let mut state = populated_state();
    state.version = 0;

    save_state(dir.path(), &state).expect("save");

    let loaded = load_state(dir.path()).expect("load");
    assert_eq!(loaded.version, CURRENT_STATE_SCHEMA_VERSION);
}
