use crate::commands::{Command, flag_usage, parse_flags};
use crate::error::Result;
use crate::state::types::State;
use crate::ui::Logger;
use clap::Parser;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "director-password",
    about = "Prints the BOSH director admin password",
    no_binary_name = true,
    disable_help_flag = true
)]
struct DirectorPasswordArgs {}

pub struct DirectorPassword {
    logger: Arc<dyn Logger>,
}

impl DirectorPassword {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Command for DirectorPassword {
    fn execute(&self, subcommand_flags: &[String], state: State) -> Result<State> {
        let _: DirectorPasswordArgs = parse_flags(subcommand_flags)?;
        self.logger.println(state.director_password()?);
        Ok(state)
    }

    fn usage(&self) -> String {
        flag_usage::<DirectorPasswordArgs>()
    }

    fn requires_state(&self) -> bool {
        true
    }
}
