//! Key pairs and VPC inspection through EC2

use super::cli::{AwsCli, error_code};
use crate::error::{BblError, Result};
use crate::state::types::KeyPair;
use crate::traits::{KeyPairDeleter, KeyPairSynchronizer, VpcStatusChecker};
use crate::utils::command_exec::{capture_success, require_binary};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

const SERVICE: &str = "ec2";
const KEY_PAIR_NOT_FOUND: &str = "InvalidKeyPair.NotFound";
const KEYGEN_TIMEOUT: Duration = Duration::from_secs(60);

/// Instances the environment itself runs; they do not block deletion
const ENVIRONMENT_INSTANCE_NAMES: &[&str] = &["bosh/0", "NAT"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesOutput {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Instance {
    #[serde(default)]
    state: Option<InstanceState>,
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceState {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Tag {
    key: String,
    #[serde(default)]
    value: String,
}

pub struct Ec2 {
    cli: Arc<AwsCli>,
}

impl Ec2 {
    pub fn new(cli: Arc<AwsCli>) -> Self {
        Self { cli }
    }

    fn remote_key_pair_exists(&self, name: &str) -> Result<bool> {
        match self
            .cli
            .call(SERVICE, "describe-key-pairs", &["--key-names", name])
        {
            Ok(_) => Ok(true),
            Err(err) if error_code(&err) == Some(KEY_PAIR_NOT_FOUND) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn import(&self, name: &str, public_key: &str) -> Result<()> {
        let scratch = tempfile::tempdir()?;
        let path = scratch.path().join("key.pub");
        fs::write(&path, public_key)?;

        let material = format!("fileb://{}", path.display());
        self.cli.call(
            SERVICE,
            "import-key-pair",
            &["--key-name", name, "--public-key-material", &material],
        )?;
        Ok(())
    }
}

impl KeyPairSynchronizer for Ec2 {
    fn sync(&self, key_pair: KeyPair) -> Result<KeyPair> {
        let remote_exists = self.remote_key_pair_exists(&key_pair.name)?;

        if key_pair.has_key_material() {
            if !remote_exists {
                self.import(&key_pair.name, &key_pair.public_key)?;
            }
            return Ok(key_pair);
        }

        // A remote key without local private material is unusable; replace it.
        if remote_exists {
            self.delete(&key_pair.name)?;
        }

        let (private_key, public_key) = generate_rsa_key_pair()?;
        self.import(&key_pair.name, &public_key)?;

        Ok(KeyPair {
            name: key_pair.name,
            private_key,
            public_key,
        })
    }
}

impl KeyPairDeleter for Ec2 {
    fn delete(&self, name: &str) -> Result<()> {
        self.cli
            .call(SERVICE, "delete-key-pair", &["--key-name", name])?;
        Ok(())
    }
}

impl VpcStatusChecker for Ec2 {
    fn validate_safe_to_delete(&self, vpc_id: &str) -> Result<()> {
        if vpc_id.is_empty() {
            return Err(BblError::Other(
                "stack did not report a VPC to validate".to_string(),
            ));
        }

        let filter = format!("Name=vpc-id,Values={}", vpc_id);
        let response = self
            .cli
            .call(SERVICE, "describe-instances", &["--filters", &filter])?;
        check_instances(response, vpc_id)
    }
}

/// Fail when any live instance other than the director runs in the VPC
pub(crate) fn check_instances(response: Value, vpc_id: &str) -> Result<()> {
    let output: DescribeInstancesOutput = serde_json::from_value(response)?;

    let blocking = output
        .reservations
        .iter()
        .flat_map(|reservation| &reservation.instances)
        .filter(|instance| !is_terminated(instance))
        .any(|instance| !is_environment_instance(instance));

    if blocking {
        return Err(BblError::VpcNotSafeToDelete {
            vpc_id: vpc_id.to_string(),
        });
    }
    Ok(())
}

fn is_terminated(instance: &Instance) -> bool {
    instance
        .state
        .as_ref()
        .is_some_and(|state| state.name == "terminated")
}

fn is_environment_instance(instance: &Instance) -> bool {
    instance
        .tags
        .iter()
        .any(|tag| tag.key == "Name" && ENVIRONMENT_INSTANCE_NAMES.contains(&tag.value.as_str()))
}

/// Produce a PEM private key and its OpenSSH public key with `ssh-keygen`
fn generate_rsa_key_pair() -> Result<(String, String)> {
    let binary = require_binary("ssh-keygen")?;
    let scratch = tempfile::tempdir()?;
    let key_path = scratch.path().join("key");

    let mut cmd = Command::new(binary);
    cmd.args(["-q", "-t", "rsa", "-b", "4096", "-m", "PEM", "-N", "", "-f"])
        .arg(&key_path);
    capture_success(&mut cmd, "ssh-keygen", KEYGEN_TIMEOUT)?;

    let private_key = read_key(&key_path)?;
    let public_key = read_key(&key_path.with_extension("pub"))?;
    Ok((private_key, public_key))
}

fn read_key(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| BblError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}
