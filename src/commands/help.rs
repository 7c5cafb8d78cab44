use crate::commands::{Command, HELP_COMMAND};
use crate::error::{BblError, Result};
use crate::project_identity;
use crate::state::types::State;
use crate::ui::Logger;
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn global_usage() -> String {
    format!(
        "Usage:
  {bin} [GLOBAL OPTIONS] COMMAND [OPTIONS]

Global Options:
  --help               [-h]  Prints usage
  --state-dir                Directory that stores the {state_file} (defaults to the working directory)
  --endpoint-override        Overrides the AWS endpoint URL",
        bin = project_identity::BINARY_NAME,
        state_file = project_identity::STATE_FILE_NAME,
    )
}

/// Prints global usage, the command list, or a single command's usage
pub struct Help {
    logger: Arc<dyn Logger>,
    usages: BTreeMap<String, String>,
}

impl Help {
    /// `usages` maps every other command name to its usage text.
    pub fn new(logger: Arc<dyn Logger>, usages: BTreeMap<String, String>) -> Self {
        Self { logger, usages }
    }

    fn summary(usage: &str) -> &str {
        usage.lines().next().unwrap_or_default().trim()
    }
}

impl Command for Help {
    fn execute(&self, subcommand_flags: &[String], state: State) -> Result<State> {
        if let Some(topic) = subcommand_flags.first().filter(|t| !t.starts_with('-')) {
            if topic == HELP_COMMAND {
                self.logger.println(&self.usage());
                return Ok(state);
            }
            let usage = self
                .usages
                .get(topic)
                .ok_or_else(|| BblError::UnrecognizedCommand(topic.clone()))?;
            self.logger.println(usage.trim_end());
            return Ok(state);
        }

        self.logger.println(&global_usage());
        self.logger.println("");
        self.logger.println("Commands:");
        for (name, usage) in &self.usages {
            self.logger
                .println(&format!("  {:<20} {}", name, Self::summary(usage)));
        }
        self.logger.println(&format!("  {:<20} {}", HELP_COMMAND, self.usage()));
        Ok(state)
    }

    fn usage(&self) -> String {
        "Prints usage, or the usage of one command".to_string()
    }
}
