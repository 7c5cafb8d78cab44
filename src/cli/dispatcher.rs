//! Command dispatcher
//!
//! Runs the parsed command against the state of its directory and persists
//! what the command returns.

use crate::cli::command_set::CommandSet;
use crate::cli::parser::GlobalConfiguration;
use crate::error::{BblError, Result};
use crate::state::types::State;
use crate::traits::StateStore;

pub fn dispatch(
    config: &GlobalConfiguration,
    commands: &CommandSet,
    store: &dyn StateStore,
) -> Result<()> {
    // The parser already rejected unknown names.
    let command = commands.get(&config.command).ok_or_else(|| {
        BblError::Internal(format!(
            "no command registered for '{}'",
            config.command
        ))
    })?;

    let loaded = match store.load() {
        Ok(state) => state,
        Err(BblError::StateNotFound { .. }) if !command.requires_state() => State::default(),
        Err(e) => return Err(e),
    };

    let next = command.execute(&config.subcommand_flags, loaded.clone())?;

    if next != loaded {
        store.save(&next)?;
    }

    Ok(())
}
