//! Central project identity contract.
//!
//! Runtime identity values shared by the CLI, the state store and messages.

pub const BINARY_NAME: &str = "bbl";
pub const STATE_FILE_NAME: &str = "bbl-state.json";
pub const ENV_PREFIX: &str = "BBL";

pub fn env_key(suffix: &str) -> String {
    format!("{}_{}", ENV_PREFIX, suffix)
}

pub fn cli_with(args: &str) -> String {
    format!("{} {}", BINARY_NAME, args)
}
