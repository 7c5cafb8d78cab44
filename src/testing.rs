//! In-memory fakes for the capability traits, shared by unit tests.

use crate::error::{BblError, Result};
use crate::state::types::{BoshInitState, KeyPair, State};
use crate::traits::{
    AwsConfig, BoshDeleter, BoshDeployer, ClientConfigurator,
    DeployInput, DeployOutput, InfrastructureManager, KeyPairDeleter, KeyPairSynchronizer,
    SslKeyPair, SslKeyPairGenerator, Stack, StackManager, StateStore, StringGenerator,
    VpcStatusChecker,
};
use crate::ui::Logger;
use std::sync::{Arc, Mutex};

/// Ordered record of calls across several fakes
#[derive(Debug, Default, Clone)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Configurable failure for a fake call
#[derive(Debug, Default)]
pub struct Failure(Mutex<Option<String>>);

impl Failure {
    pub fn set(&self, message: &str) {
        *self.0.lock().unwrap() = Some(message.to_string());
    }

    fn check(&self) -> Result<()> {
        match self.0.lock().unwrap().clone() {
            Some(message) => Err(BblError::Other(message)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeLogger {
    pub steps: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub lines: Mutex<Vec<String>>,
}

impl FakeLogger {
    pub fn steps(&self) -> Vec<String> {
        self.steps.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Logger for FakeLogger {
    fn step(&self, message: &str) {
        self.steps.lock().unwrap().push(message.to_string());
    }

    fn println(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }

    fn prompt(&self, message: &str) {
        self.prompts.lock().unwrap().push(message.to_string());
    }
}

#[derive(Debug, Default)]
pub struct FakeClientConfigurator {
    pub configs: Mutex<Vec<AwsConfig>>,
}

impl ClientConfigurator for FakeClientConfigurator {
    fn set_config(&self, config: AwsConfig) {
        self.configs.lock().unwrap().push(config);
    }
}

#[derive(Debug, Default)]
pub struct FakeStackManager {
    pub stack: Mutex<Stack>,
    pub described: Mutex<Vec<String>>,
    pub failure: Failure,
}

impl StackManager for FakeStackManager {
    fn describe(&self, stack_name: &str) -> Result<Stack> {
        self.described.lock().unwrap().push(stack_name.to_string());
        self.failure.check()?;
        Ok(self.stack.lock().unwrap().clone())
    }
}

#[derive(Debug, Default)]
pub struct FakeInfrastructureManager {
    pub journal: Journal,
    pub stack: Mutex<Stack>,
    pub created: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<String>>,
    pub create_failure: Failure,
    pub delete_failure: Failure,
}

impl InfrastructureManager for FakeInfrastructureManager {
    fn create(&self, key_pair_name: &str, stack_name: &str) -> Result<Stack> {
        self.journal.record(format!("create stack {}", stack_name));
        self.created
            .lock()
            .unwrap()
            .push((key_pair_name.to_string(), stack_name.to_string()));
        self.create_failure.check()?;
        let mut stack = self.stack.lock().unwrap().clone();
        stack.name = stack_name.to_string();
        Ok(stack)
    }

    fn exists(&self, _stack_name: &str) -> Result<bool> {
        Ok(!self.created.lock().unwrap().is_empty())
    }

    fn delete(&self, stack_name: &str) -> Result<()> {
        self.journal.record(format!("delete stack {}", stack_name));
        self.deleted.lock().unwrap().push(stack_name.to_string());
        self.delete_failure.check()
    }
}

#[derive(Debug, Default)]
pub struct FakeKeyPairSynchronizer {
    pub journal: Journal,
    pub received: Mutex<Vec<KeyPair>>,
    pub failure: Failure,
}

impl KeyPairSynchronizer for FakeKeyPairSynchronizer {
    fn sync(&self, key_pair: KeyPair) -> Result<KeyPair> {
        self.journal.record(format!("sync key pair {}", key_pair.name));
        self.received.lock().unwrap().push(key_pair.clone());
        self.failure.check()?;

        let mut synced = key_pair;
        if !synced.has_key_material() {
            synced.private_key = "some-private-key".to_string();
            synced.public_key = "some-public-key".to_string();
        }
        Ok(synced)
    }
}

#[derive(Debug, Default)]
pub struct FakeKeyPairDeleter {
    pub journal: Journal,
    pub deleted: Mutex<Vec<String>>,
    pub failure: Failure,
}

impl KeyPairDeleter for FakeKeyPairDeleter {
    fn delete(&self, name: &str) -> Result<()> {
        self.journal.record(format!("delete key pair {}", name));
        self.deleted.lock().unwrap().push(name.to_string());
        self.failure.check()
    }
}

#[derive(Debug, Default)]
pub struct FakeVpcStatusChecker {
    pub journal: Journal,
    pub received: Mutex<Vec<String>>,
    pub failure: Failure,
}

impl VpcStatusChecker for FakeVpcStatusChecker {
    fn validate_safe_to_delete(&self, vpc_id: &str) -> Result<()> {
        self.journal.record(format!("validate vpc {}", vpc_id));
        self.received.lock().unwrap().push(vpc_id.to_string());
        self.failure.check()
    }
}

#[derive(Debug, Default)]
pub struct FakeBoshDeleter {
    pub journal: Journal,
    pub received: Mutex<Vec<(String, BoshInitState, String)>>,
    pub failure: Failure,
}

impl FakeBoshDeleter {
    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl BoshDeleter for FakeBoshDeleter {
    fn delete(&self, manifest: &str, state: &BoshInitState, ec2_private_key: &str) -> Result<()> {
        self.journal.record("delete director");
        self.received.lock().unwrap().push((
            manifest.to_string(),
            state.clone(),
            ec2_private_key.to_string(),
        ));
        self.failure.check()
    }
}

#[derive(Debug, Default)]
pub struct FakeBoshDeployer {
    pub journal: Journal,
    pub received: Mutex<Vec<DeployInput>>,
    pub output: Mutex<DeployOutput>,
    pub failure: Failure,
    /// Fail after recording `output`, as a deploy that got partway does
    pub partial_failure: Failure,
}

impl BoshDeployer for FakeBoshDeployer {
    fn deploy(&self, input: DeployInput) -> Result<DeployOutput> {
        self.journal.record("deploy director");
        self.received.lock().unwrap().push(input);
        self.failure.check()?;
        let output = self.output.lock().unwrap().clone();
        if let Err(err) = self.partial_failure.check() {
            return Err(BblError::BoshDeployFailed {
                output: Box::new(output),
                reason: err.to_string(),
            });
        }
        Ok(output)
    }
}

#[derive(Debug, Default)]
pub struct FakeSslKeyPairGenerator {
    pub received: Mutex<Vec<String>>,
    pub failure: Failure,
}

impl SslKeyPairGenerator for FakeSslKeyPairGenerator {
    fn generate(&self, common_name: &str) -> Result<SslKeyPair> {
        self.received.lock().unwrap().push(common_name.to_string());
        self.failure.check()?;
        Ok(SslKeyPair {
            certificate: "some-certificate".to_string(),
            private_key: "some-ssl-private-key".to_string(),
        })
    }
}

/// Returns `<prefix>some-random-string` for every request
#[derive(Debug, Default)]
pub struct FakeStringGenerator {
    pub prefixes: Mutex<Vec<String>>,
}

impl StringGenerator for FakeStringGenerator {
    fn generate(&self, prefix: &str, _length: usize) -> Result<String> {
        self.prefixes.lock().unwrap().push(prefix.to_string());
        Ok(format!("{}some-random-string", prefix))
    }
}

#[derive(Debug, Default)]
pub struct FakeStateStore {
    pub state: Mutex<Option<State>>,
    pub saved: Mutex<Vec<State>>,
    pub failure: Failure,
}

impl FakeStateStore {
    pub fn with_state(state: State) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    pub fn saves(&self) -> Vec<State> {
        self.saved.lock().unwrap().clone()
    }
}

impl StateStore for FakeStateStore {
    fn load(&self) -> Result<State> {
        self.state
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BblError::StateNotFound {
                dir: "some/state/dir".into(),
            })
    }

    fn save(&self, state: &State) -> Result<()> {
        self.failure.check()?;
        self.saved.lock().unwrap().push(state.clone());
        *self.state.lock().unwrap() = Some(state.clone());
        Ok(())
    }
}
