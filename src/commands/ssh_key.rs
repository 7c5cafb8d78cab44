use crate::commands::{Command, flag_usage, parse_flags};
use crate::error::Result;
use crate::state::types::State;
use crate::ui::Logger;
use clap::Parser;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "ssh-key",
    about = "Prints the SSH private key of the director's EC2 key pair",
    no_binary_name = true,
    disable_help_flag = true
)]
struct SshKeyArgs {}

pub struct SshKey {
    logger: Arc<dyn Logger>,
}

impl SshKey {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Command for SshKey {
    fn execute(&self, subcommand_flags: &[String], state: State) -> Result<State> {
        let _: SshKeyArgs = parse_flags(subcommand_flags)?;
        self.logger.println(state.ssh_private_key()?);
        Ok(state)
    }

    fn usage(&self) -> String {
        flag_usage::<SshKeyArgs>()
    }

    fn requires_state(&self) -> bool {
        true
    }
}
