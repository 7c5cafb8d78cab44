use crate::commands::Command;
use crate::error::Result;
use crate::project_identity;
use crate::state::types::State;
use crate::ui::Logger;
use std::sync::Arc;

pub struct Version {
    logger: Arc<dyn Logger>,
}

impl Version {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Command for Version {
    fn execute(&self, _subcommand_flags: &[String], state: State) -> Result<State> {
        self.logger.println(&format!(
            "{} {}",
            project_identity::BINARY_NAME,
            env!("CARGO_PKG_VERSION")
        ));
        Ok(state)
    }

    fn usage(&self) -> String {
        "Prints the version".to_string()
    }
}
