use super::{BoshInitExecutor, Workspace, partial_deploy_failure};
use crate::bosh::credentials::Credentials;
use crate::error::BblError;
use crate::state::types::BoshInitState;
use crate::testing::FakeStringGenerator;
use crate::traits::BoshDeleter;
use serde_json::json;
use std::fs;
use std::sync::Arc;

fn some_state() -> BoshInitState {
    let mut state = BoshInitState::new();
    state.insert("director_id".to_string(), json!("some-director-id"));
    state
}

#[test]
fn writes_manifest_key_and_state() {
    let workspace = Workspace::prepare("name: bosh\n", &some_state(), "some-private-key").unwrap();

    let dir = workspace.manifest_path().parent().unwrap().to_path_buf();
    assert_eq!(fs::read_to_string(workspace.manifest_path()).unwrap(), "name: bosh\n");
    assert_eq!(fs::read_to_string(dir.join("bosh.pem")).unwrap(), "some-private-key");
    assert_eq!(workspace.read_state().unwrap(), some_state());
}

#[test]
fn empty_state_is_not_written() {
    let workspace = Workspace::prepare("name: bosh\n", &BoshInitState::new(), "key").unwrap();

    assert!(!workspace.state_path().exists());
    assert!(workspace.read_state().unwrap().is_empty());
}

#[test]
fn corrupted_state_names_its_path() {
    let workspace = Workspace::prepare("name: bosh\n", &BoshInitState::new(), "key").unwrap();
    fs::write(workspace.state_path(), "not json").unwrap();

    let err = workspace.read_state().unwrap_err();
    assert!(err.to_string().contains("bosh-state.json"));
}

#[cfg(unix)]
#[test]
fn private_key_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let workspace = Workspace::prepare("name: bosh\n", &BoshInitState::new(), "key").unwrap();
    let key = workspace.manifest_path().with_file_name("bosh.pem");

    let mode = fs::metadata(key).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn workspace_is_removed_on_drop() {
    let workspace = Workspace::prepare("name: bosh\n", &BoshInitState::new(), "key").unwrap();
    let dir = workspace.manifest_path().parent().unwrap().to_path_buf();

    drop(workspace);

    assert!(!dir.exists());
}

#[test]
fn delete_without_recorded_deployment_is_a_no_op() {
    let executor = BoshInitExecutor::new(Arc::new(FakeStringGenerator::default()));

    assert!(executor.delete("", &BoshInitState::new(), "").is_ok());
}

#[test]
fn delete_with_recorded_state_is_attempted() {
    let executor = BoshInitExecutor::new(Arc::new(FakeStringGenerator::default()));

    assert!(executor.delete("", &some_state(), "").is_err());
}

fn failed_run() -> BblError {
    BblError::SystemCommandFailed {
        command: "bosh-init deploy".to_string(),
        reason: "exited with exit status: 1".to_string(),
    }
}

#[test]
fn failed_deploy_keeps_state_written_by_the_tool() {
    let workspace = Workspace::prepare("name: bosh\n", &BoshInitState::new(), "key").unwrap();
    fs::write(workspace.state_path(), r#"{"current_vm_cid":"i-123"}"#).unwrap();
    let credentials = Credentials {
        nats_password: "some-nats-password".to_string(),
        ..Credentials::default()
    };

    let err = partial_deploy_failure(
        &workspace,
        "name: bosh\n".to_string(),
        &credentials,
        BoshInitState::new(),
        failed_run(),
    );

    let BblError::BoshDeployFailed { output, reason } = err else {
        panic!("expected a partial deploy failure");
    };
    assert_eq!(reason, "System command 'bosh-init deploy' failed: exited with exit status: 1");
    assert_eq!(output.manifest, "name: bosh\n");
    assert_eq!(output.state["current_vm_cid"], json!("i-123"));
    assert_eq!(output.credentials["natsPassword"], "some-nats-password");
}

#[test]
fn failed_deploy_with_unreadable_state_keeps_previous_state() {
    let workspace = Workspace::prepare("name: bosh\n", &BoshInitState::new(), "key").unwrap();
    fs::write(workspace.state_path(), "not json").unwrap();

    let err = partial_deploy_failure(
        &workspace,
        "name: bosh\n".to_string(),
        &Credentials::default(),
        some_state(),
        failed_run(),
    );

    let BblError::BoshDeployFailed { output, .. } = err else {
        panic!("expected a partial deploy failure");
    };
    assert_eq!(output.state, some_state());
}
