//! Global flag splitter
//!
//! Separates the global options from the command name and hands everything
//! after the command to that command untouched.

use crate::commands::HELP_COMMAND;
use crate::error::{BblError, Result};
use std::collections::BTreeSet;
use std::io;
use std::path::PathBuf;

/// Source of the default state directory
pub trait WorkingDirectory {
    fn current_dir(&self) -> io::Result<PathBuf>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessWorkingDirectory;

impl WorkingDirectory for ProcessWorkingDirectory {
    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfiguration {
    pub endpoint_override: String,
    pub state_dir: PathBuf,
    pub command: String,
    pub subcommand_flags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlobalFlag {
    EndpointOverride,
    StateDir,
    Help,
}

impl GlobalFlag {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "endpoint-override" => Some(Self::EndpointOverride),
            "state-dir" => Some(Self::StateDir),
            "help" | "h" => Some(Self::Help),
            _ => None,
        }
    }

    fn takes_value(self) -> bool {
        !matches!(self, Self::Help)
    }
}

/// A `-name`, `--name` or `--name=value` token
#[derive(Debug, PartialEq, Eq)]
struct FlagToken<'a> {
    name: &'a str,
    value: Option<&'a str>,
}

fn split_flag(token: &str) -> Option<FlagToken<'_>> {
    if token == "-" {
        return None;
    }
    let stripped = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))?;

    Some(match stripped.split_once('=') {
        Some((name, value)) => FlagToken {
            name,
            value: Some(value),
        },
        None => FlagToken {
            name: stripped,
            value: None,
        },
    })
}

/// Result of locating the command token
#[derive(Debug)]
struct CommandSplit<'a> {
    global: &'a [String],
    command: Option<String>,
    rest: Vec<String>,
}

fn find_command(args: &[String]) -> CommandSplit<'_> {
    let mut i = 0;
    while i < args.len() {
        let token = &args[i];

        if token == "--" {
            let after = &args[i + 1..];
            return CommandSplit {
                global: &args[..i],
                command: after.first().cloned(),
                rest: after.get(1..).map(<[String]>::to_vec).unwrap_or_default(),
            };
        }

        let Some(flag) = split_flag(token) else {
            return CommandSplit {
                global: &args[..i],
                command: Some(token.clone()),
                rest: args[i + 1..].to_vec(),
            };
        };

        match GlobalFlag::lookup(flag.name) {
            Some(GlobalFlag::Help) => {
                return CommandSplit {
                    global: &args[..i],
                    command: Some(HELP_COMMAND.to_string()),
                    rest: args[i + 1..].to_vec(),
                };
            }
            Some(global) if global.takes_value() && flag.value.is_none() => i += 2,
            _ => i += 1,
        }
    }

    CommandSplit {
        global: args,
        command: None,
        rest: Vec::new(),
    }
}

pub struct CommandLineParser {
    usage: Box<dyn Fn()>,
    command_names: BTreeSet<String>,
    working_directory: Box<dyn WorkingDirectory>,
}

impl CommandLineParser {
    pub fn new<I, S>(
        usage: impl Fn() + 'static,
        command_names: I,
        working_directory: impl WorkingDirectory + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            usage: Box::new(usage),
            command_names: command_names.into_iter().map(Into::into).collect(),
            working_directory: Box::new(working_directory),
        }
    }

    pub fn parse(&self, args: &[String]) -> Result<GlobalConfiguration> {
        let split = find_command(args);
        let command = split.command.unwrap_or_else(|| HELP_COMMAND.to_string());

        // A help topic must itself be a known command.
        let to_validate = if command == HELP_COMMAND {
            split
                .rest
                .first()
                .filter(|topic| split_flag(topic).is_none())
                .cloned()
        } else {
            Some(command.clone())
        };
        if let Some(name) = to_validate
            && !self.command_names.contains(&name)
        {
            return Err(self.usage_error(BblError::UnrecognizedCommand(name)));
        }

        let (endpoint_override, state_dir) = self.parse_global_flags(split.global)?;
        let state_dir = match state_dir {
            Some(dir) => PathBuf::from(dir),
            None => self
                .working_directory
                .current_dir()
                .map_err(BblError::WorkingDirectory)?,
        };

        Ok(GlobalConfiguration {
            endpoint_override,
            state_dir,
            command,
            subcommand_flags: split.rest,
        })
    }

    fn parse_global_flags(&self, global: &[String]) -> Result<(String, Option<String>)> {
        let mut endpoint_override = String::new();
        let mut state_dir: Option<String> = None;

        let mut i = 0;
        while i < global.len() {
            let token = &global[i];
            i += 1;

            let Some(flag) = split_flag(token) else {
                continue;
            };
            let kind = match GlobalFlag::lookup(flag.name) {
                Some(GlobalFlag::Help) => continue,
                Some(kind) => kind,
                None => {
                    return Err(self.usage_error(BblError::Flag(format!(
                        "flag provided but not defined: -{}",
                        flag.name
                    ))));
                }
            };

            let value = match flag.value {
                Some(value) => value.to_string(),
                None => match global.get(i) {
                    Some(value) => {
                        i += 1;
                        value.clone()
                    }
                    None => {
                        return Err(self.usage_error(BblError::Flag(format!(
                            "flag needs an argument: -{}",
                            flag.name
                        ))));
                    }
                },
            };

            match kind {
                GlobalFlag::EndpointOverride => endpoint_override = value,
                GlobalFlag::StateDir => {
                    if state_dir.is_some() {
                        return Err(self.usage_error(BblError::DuplicateStateDir));
                    }
                    state_dir = Some(value);
                }
                GlobalFlag::Help => {}
            }
        }

        Ok((endpoint_override, state_dir))
    }

    fn usage_error(&self, err: BblError) -> BblError {
        (self.usage)();
        err
    }
}
