use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{BblError, Result};

/// Opaque deployment state owned by the director deployment tool.
///
/// Transported between the state file and the director lifecycle
/// capability without being interpreted.
pub type BoshInitState = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct State {
    /// Schema version, stamped by the store on every write
    pub version: u32,
    pub aws: Aws,
    pub key_pair: KeyPair,
    pub bosh: Bosh,
    pub stack: Stack,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Aws {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyPair {
    pub name: String,
    pub private_key: String,
    pub public_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bosh {
    pub director_username: String,
    pub director_password: String,
    #[serde(rename = "directorSSLCertificate")]
    pub director_ssl_certificate: String,
    #[serde(rename = "directorSSLPrivateKey")]
    pub director_ssl_private_key: String,
    /// Per-credential access map produced by the deployment tool
    pub credentials: BTreeMap<String, String>,
    pub state: BoshInitState,
    pub manifest: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stack {
    pub name: String,
}

impl State {
    /// True when no environment is recorded, regardless of schema version.
    pub fn is_empty(&self) -> bool {
        let mut unversioned = self.clone();
        unversioned.version = 0;
        unversioned == State::default()
    }

    pub fn ssh_private_key(&self) -> Result<&str> {
        non_empty(&self.key_pair.private_key, "ssh key")
    }

    pub fn director_password(&self) -> Result<&str> {
        non_empty(&self.bosh.director_password, "director password")
    }
}

impl Aws {
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty() && !self.region.is_empty()
    }
}

impl KeyPair {
    pub fn has_key_material(&self) -> bool {
        !self.private_key.is_empty() && !self.public_key.is_empty()
    }
}

fn non_empty<'a>(value: &'a str, what: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(BblError::MissingStateField(what));
    }
    Ok(value)
}
