pub mod aws;
pub mod bosh;
pub mod cli;
pub mod commands;
pub mod error;
pub mod project_identity;
pub mod state;
pub mod traits;
pub mod ui;
pub mod utils;

#[cfg(test)]
mod testing;

use cli::{CommandLineParser, CommandSet, ProcessWorkingDirectory};
use commands::{COMMAND_NAMES, help};
use error::Result;
use state::FilesystemStateStore;
use std::process::exit;

/// Parse `args` (without the binary name) and run the selected command.
pub fn run(args: &[String]) -> Result<()> {
    let parser = CommandLineParser::new(
        || eprintln!("{}", help::global_usage()),
        COMMAND_NAMES.iter().copied(),
        ProcessWorkingDirectory,
    );
    let config = parser.parse(args)?;

    let commands = CommandSet::production(&config);
    let store = FilesystemStateStore::new(config.state_dir.clone());
    cli::dispatcher::dispatch(&config, &commands, &store)
}

/// Run bbl CLI entrypoint.
pub fn run_cli() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Err(e) = run(&args) {
        ui::error(&format!("{}", e));
        exit(1);
    }
}
