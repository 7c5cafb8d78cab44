use crate::commands::{Command, aws_config, flag_usage, parse_flags};
use crate::error::{BblError, Result};
use crate::state::types::State;
use crate::traits::{
    BoshDeleter, ClientConfigurator, InfrastructureManager, KeyPairDeleter, StackManager,
    VpcStatusChecker, stack_outputs,
};
use crate::ui::Logger;
use clap::Parser;
use std::io::BufRead;
use std::sync::{Arc, Mutex};

pub const CONFIRMATION_PROMPT: &str =
    "Are you sure you want to delete your infrastructure? This operation cannot be undone!";

#[derive(Parser, Debug)]
#[command(
    name = "destroy",
    about = "Tears down a BOSH director environment on AWS",
    no_binary_name = true,
    disable_help_flag = true
)]
struct DestroyArgs {
    /// Do not ask for confirmation before deleting
    #[arg(short = 'n', long)]
    no_confirm: bool,
}

pub struct Destroy {
    logger: Arc<dyn Logger>,
    stdin: Mutex<Box<dyn BufRead + Send>>,
    client_configurator: Arc<dyn ClientConfigurator>,
    bosh_deleter: Arc<dyn BoshDeleter>,
    vpc_status_checker: Arc<dyn VpcStatusChecker>,
    stack_manager: Arc<dyn StackManager>,
    infrastructure_manager: Arc<dyn InfrastructureManager>,
    key_pair_deleter: Arc<dyn KeyPairDeleter>,
}

impl Destroy {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        logger: Arc<dyn Logger>,
        stdin: Box<dyn BufRead + Send>,
        client_configurator: Arc<dyn ClientConfigurator>,
        bosh_deleter: Arc<dyn BoshDeleter>,
        vpc_status_checker: Arc<dyn VpcStatusChecker>,
        stack_manager: Arc<dyn StackManager>,
        infrastructure_manager: Arc<dyn InfrastructureManager>,
        key_pair_deleter: Arc<dyn KeyPairDeleter>,
    ) -> Self {
        Self {
            logger,
            stdin: Mutex::new(stdin),
            client_configurator,
            bosh_deleter,
            vpc_status_checker,
            stack_manager,
            infrastructure_manager,
            key_pair_deleter,
        }
    }

    fn confirmed(&self) -> Result<bool> {
        self.logger.prompt(CONFIRMATION_PROMPT);

        let mut answer = Vec::new();
        self.stdin
            .lock()
            .map_err(|_| BblError::Internal("stdin lock poisoned".to_string()))?
            .read_until(b'\n', &mut answer)?;

        // Any reply other than yes declines, including undecodable bytes.
        let answer = String::from_utf8_lossy(&answer).trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

impl Command for Destroy {
    fn execute(&self, subcommand_flags: &[String], state: State) -> Result<State> {
        let args: DestroyArgs = parse_flags(subcommand_flags)?;

        if !args.no_confirm && !self.confirmed()? {
            self.logger.step("exiting");
            return Ok(state);
        }

        self.logger.step("destroying BOSH director and AWS stack");
        self.client_configurator.set_config(aws_config(&state.aws));

        // Nothing is deleted until the VPC is known to hold no other workloads.
        let stack = self.stack_manager.describe(&state.stack.name)?;
        self.vpc_status_checker
            .validate_safe_to_delete(stack.output(stack_outputs::VPC_ID))?;

        self.logger.step("deleting BOSH director");
        self.bosh_deleter.delete(
            &state.bosh.manifest,
            &state.bosh.state,
            &state.key_pair.private_key,
        )?;

        self.logger.step("deleting CloudFormation stack");
        self.infrastructure_manager.delete(&state.stack.name)?;

        self.logger.step("deleting EC2 key pair");
        self.key_pair_deleter.delete(&state.key_pair.name)?;

        Ok(State::default())
    }

    fn usage(&self) -> String {
        flag_usage::<DestroyArgs>()
    }

    fn requires_state(&self) -> bool {
        true
    }
}
