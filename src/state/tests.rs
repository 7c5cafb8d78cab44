use super::types::{BoshInitState, State};
use crate::error::BblError;

#[test]
fn default_state_is_empty_even_when_versioned() {
    let mut state = State::default();
    assert!(state.is_empty());

    state.version = 1;
    assert!(state.is_empty());

    state.stack.name = "some-stack-name".to_string();
    assert!(!state.is_empty());
}

#[test]
fn missing_ssh_key_reports_field() {
    let state = State::default();
    let err = state.ssh_private_key().expect_err("empty key should fail");
    assert!(matches!(err, BblError::MissingStateField("ssh key")));
    assert_eq!(err.to_string(), "Could not retrieve ssh key");
}

#[test]
fn missing_director_password_reports_field() {
    let state = State::default();
    let err = state
        .director_password()
        .expect_err("empty password should fail");
    assert_eq!(err.to_string(), "Could not retrieve director password");
}

#[test]
fn deserializes_camel_case_document_with_missing_groups() {
    let state: State = serde_json::from_str(
        r#"{
            "keyPair": { "privateKey": "some-ssh-private-key" },
            "bosh": {
                "directorPassword": "some-director-password",
                "directorSSLCertificate": "some-certificate",
                "state": { "key": "value" }
            }
        }"#,
    )
    .expect("state should parse");

    assert_eq!(state.ssh_private_key().unwrap(), "some-ssh-private-key");
    assert_eq!(state.director_password().unwrap(), "some-director-password");
    assert_eq!(state.bosh.director_ssl_certificate, "some-certificate");
    assert!(state.stack.name.is_empty());

    let mut expected = BoshInitState::new();
    expected.insert("key".to_string(), serde_json::json!("value"));
    assert_eq!(state.bosh.state, expected);
}

#[test]
fn serializes_ssl_fields_with_upper_case_acronym() {
    let mut state = State::default();
    state.bosh.director_ssl_private_key = "some-key".to_string();
    let json = serde_json::to_value(&state).expect("serialize");
    assert_eq!(json["bosh"]["directorSSLPrivateKey"], "some-key");
    assert_eq!(json["keyPair"]["name"], "");
}
