//! Command set
//!
//! Every command receives its own flags and the loaded state, and returns
//! the state the dispatcher should persist.

pub mod destroy;
pub mod director_password;
pub mod help;
pub mod ssh_key;
pub mod up;
pub mod version;

use crate::error::{BblError, Result};
use crate::state::types::{Aws, State};
use crate::traits::AwsConfig;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};

pub use destroy::Destroy;
pub use director_password::DirectorPassword;
pub use help::Help;
pub use ssh_key::SshKey;
pub use up::Up;
pub use version::Version;

pub const UP_COMMAND: &str = "up";
pub const DESTROY_COMMAND: &str = "destroy";
pub const SSH_KEY_COMMAND: &str = "ssh-key";
pub const DIRECTOR_PASSWORD_COMMAND: &str = "director-password";
pub const VERSION_COMMAND: &str = "version";
pub const HELP_COMMAND: &str = "help";

pub const COMMAND_NAMES: &[&str] = &[
    UP_COMMAND,
    DESTROY_COMMAND,
    SSH_KEY_COMMAND,
    DIRECTOR_PASSWORD_COMMAND,
    VERSION_COMMAND,
    HELP_COMMAND,
];

pub trait Command: Send + Sync {
    fn execute(&self, subcommand_flags: &[String], state: State) -> Result<State>;

    fn usage(&self) -> String;

    /// Whether a missing state file is an error rather than an empty state
    fn requires_state(&self) -> bool {
        false
    }
}

/// Parse a command's own flags (no binary name in `subcommand_flags`).
pub(crate) fn parse_flags<T: Parser>(subcommand_flags: &[String]) -> Result<T> {
    T::try_parse_from(subcommand_flags).map_err(flag_error)
}

/// Unknown flags read like the global ones: `flag provided but not defined: -name`.
fn flag_error(err: clap::Error) -> BblError {
    let unknown = match (err.kind(), err.get(ContextKind::InvalidArg)) {
        (ErrorKind::UnknownArgument, Some(ContextValue::String(arg))) => Some(arg.clone()),
        _ => None,
    };

    match unknown {
        Some(arg) => {
            let name = arg.trim_start_matches('-');
            let name = name.split_once('=').map_or(name, |(name, _)| name);
            BblError::Flag(format!("flag provided but not defined: -{}", name))
        }
        None => BblError::Flag(err.to_string().trim_end().to_string()),
    }
}

/// Rendered flag help for a command's argument struct.
pub(crate) fn flag_usage<T: CommandFactory>() -> String {
    T::command().render_help().to_string()
}

pub(crate) fn aws_config(aws: &Aws) -> AwsConfig {
    AwsConfig {
        access_key_id: aws.access_key_id.clone(),
        secret_access_key: aws.secret_access_key.clone(),
        region: aws.region.clone(),
    }
}
