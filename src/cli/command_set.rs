//! Name to command mapping, built once at startup

use crate::aws::{AwsCli, CloudFormation, Ec2};
use crate::bosh::{BoshInitExecutor, OpenSslKeyPairGenerator};
use crate::cli::parser::GlobalConfiguration;
use crate::commands::{
    Command, DESTROY_COMMAND, DIRECTOR_PASSWORD_COMMAND, Destroy, DirectorPassword, HELP_COMMAND,
    Help, SSH_KEY_COMMAND, SshKey, UP_COMMAND, Up, VERSION_COMMAND, Version,
};
use crate::state::FilesystemStateStore;
use crate::traits::StringGenerator;
use crate::ui::{ConsoleLogger, Logger};
use crate::utils::random::RandomStringGenerator;
use std::collections::BTreeMap;
use std::io::BufReader;
use std::sync::Arc;

#[derive(Default)]
pub struct CommandSet {
    commands: BTreeMap<String, Option<Box<dyn Command>>>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, command: impl Command + 'static) -> Self {
        self.commands
            .insert(name.to_string(), Some(Box::new(command)));
        self
    }

    /// Register a name without an implementation.
    #[cfg(test)]
    pub fn placeholder(mut self, name: &str) -> Self {
        self.commands.insert(name.to_string(), None);
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// `None` when the name is unknown or registered without an implementation
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name)?.as_deref()
    }

    pub fn usages(&self) -> BTreeMap<String, String> {
        self.commands
            .iter()
            .filter_map(|(name, command)| Some((name.clone(), command.as_ref()?.usage())))
            .collect()
    }

    /// Wire every command to the AWS CLI, `bosh-init` and the state directory.
    pub fn production(config: &GlobalConfiguration) -> Self {
        let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger);
        let aws = Arc::new(AwsCli::new(config.endpoint_override.clone()));
        let cloudformation = Arc::new(CloudFormation::new(aws.clone()));
        let ec2 = Arc::new(Ec2::new(aws.clone()));
        let strings: Arc<dyn StringGenerator> = Arc::new(RandomStringGenerator);
        let bosh_init = Arc::new(BoshInitExecutor::new(strings.clone()));
        let store = Arc::new(FilesystemStateStore::new(config.state_dir.clone()));

        let set = Self::new()
            .with(
                UP_COMMAND,
                Up::new(
                    logger.clone(),
                    aws.clone(),
                    ec2.clone(),
                    cloudformation.clone(),
                    strings,
                    Arc::new(OpenSslKeyPairGenerator::default()),
                    bosh_init.clone(),
                    store,
                ),
            )
            .with(
                DESTROY_COMMAND,
                Destroy::new(
                    logger.clone(),
                    Box::new(BufReader::new(std::io::stdin())),
                    aws,
                    bosh_init,
                    ec2.clone(),
                    cloudformation.clone(),
                    cloudformation,
                    ec2,
                ),
            )
            .with(SSH_KEY_COMMAND, SshKey::new(logger.clone()))
            .with(DIRECTOR_PASSWORD_COMMAND, DirectorPassword::new(logger.clone()))
            .with(VERSION_COMMAND, Version::new(logger.clone()));

        let usages = set.usages();
        set.with(HELP_COMMAND, Help::new(logger, usages))
    }
}
