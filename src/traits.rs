//! Capability traits for dependency injection and testability
//!
//! Commands depend on these contracts instead of concrete AWS or
//! `bosh-init` clients. Production implementations live in [`crate::aws`]
//! and [`crate::bosh`]; tests use the fakes in `crate::testing`.

use crate::error::Result;
use crate::state::types::{BoshInitState, KeyPair, State};
use std::collections::{BTreeMap, HashMap};

/// Credentials and region every AWS call is made with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

/// Output keys reported by the network stack
pub mod stack_outputs {
    pub const VPC_ID: &str = "VPCID";
    pub const SUBNET: &str = "BOSHSubnet";
    pub const SUBNET_AZ: &str = "BOSHSubnetAZ";
    pub const ELASTIC_IP: &str = "BOSHEIP";
    pub const USER_ACCESS_KEY: &str = "BOSHUserAccessKey";
    pub const USER_SECRET_ACCESS_KEY: &str = "BOSHUserSecretAccessKey";
    pub const SECURITY_GROUP: &str = "BOSHSecurityGroup";
}

/// Live description of a CloudFormation stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    pub name: String,
    pub status: String,
    pub outputs: HashMap<String, String>,
}

impl Stack {
    pub fn output(&self, key: &str) -> &str {
        self.outputs.get(key).map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Certificate {
    pub name: String,
    pub body: String,
    pub arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SslKeyPair {
    pub certificate: String,
    pub private_key: String,
}

/// Network attributes the director is deployed into, taken from stack outputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfrastructureOutputs {
    pub subnet_id: String,
    pub availability_zone: String,
    pub elastic_ip: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub security_group: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployInput {
    pub director_name: String,
    pub director_username: String,
    pub director_password: String,
    pub region: String,
    pub infrastructure: InfrastructureOutputs,
    pub key_pair: KeyPair,
    pub ssl_key_pair: SslKeyPair,
    pub state: BoshInitState,
    pub credentials: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployOutput {
    pub manifest: String,
    pub state: BoshInitState,
    pub credentials: BTreeMap<String, String>,
}

/// Receives the AWS identity before any AWS capability is used
pub trait ClientConfigurator: Send + Sync {
    fn set_config(&self, config: AwsConfig);
}

pub trait StackManager: Send + Sync {
    fn describe(&self, stack_name: &str) -> Result<Stack>;
}

pub trait InfrastructureManager: Send + Sync {
    /// Create the stack, or update it in place when it already exists
    fn create(&self, key_pair_name: &str, stack_name: &str) -> Result<Stack>;
    fn exists(&self, stack_name: &str) -> Result<bool>;
    fn delete(&self, stack_name: &str) -> Result<()>;
}

pub trait KeyPairSynchronizer: Send + Sync {
    /// Ensure the key pair exists remotely and locally, returning the result
    fn sync(&self, key_pair: KeyPair) -> Result<KeyPair>;
}

pub trait KeyPairDeleter: Send + Sync {
    fn delete(&self, name: &str) -> Result<()>;
}

pub trait VpcStatusChecker: Send + Sync {
    /// Refuse when workloads other than the director still run in the VPC
    fn validate_safe_to_delete(&self, vpc_id: &str) -> Result<()>;
}

pub trait CertificateDescriber: Send + Sync {
    fn describe(&self, certificate_name: &str) -> Result<Certificate>;
}

pub trait BoshDeployer: Send + Sync {
    fn deploy(&self, input: DeployInput) -> Result<DeployOutput>;
}

pub trait BoshDeleter: Send + Sync {
    fn delete(&self, manifest: &str, state: &BoshInitState, ec2_private_key: &str) -> Result<()>;
}

pub trait SslKeyPairGenerator: Send + Sync {
    fn generate(&self, common_name: &str) -> Result<SslKeyPair>;
}

pub trait StringGenerator: Send + Sync {
    fn generate(&self, prefix: &str, length: usize) -> Result<String>;
}

/// Trait for state persistence
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<State>;
    fn save(&self, state: &State) -> Result<()>;
}
