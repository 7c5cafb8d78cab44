use std::path::PathBuf;
use thiserror::Error;

use crate::project_identity;
use crate::traits::DeployOutput;

#[derive(Error, Debug)]
pub enum BblError {
    #[error("Unrecognized command '{0}'")]
    UnrecognizedCommand(String),

    #[error("Invalid usage: cannot specify global 'state-dir' flag more than once.")]
    DuplicateStateDir,

    /// Flag parsing failure, global or subcommand
    #[error("{0}")]
    Flag(String),

    #[error(
        "{} not found in {dir:?}, ensure you're running this command in the proper state directory or create a new environment with {}",
        project_identity::STATE_FILE_NAME,
        project_identity::cli_with("up")
    )]
    StateNotFound { dir: PathBuf },

    #[error("Could not retrieve {0}")]
    MissingStateField(&'static str),

    #[error("State file {path} has version {found}, newer than supported version {supported}")]
    UnsupportedStateVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    /// Failure to determine the default state directory, surfaced verbatim
    #[error(transparent)]
    WorkingDirectory(std::io::Error),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    YamlError(#[from] serde_yml::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("System dependency missing: {0}")]
    DependencyMissing(String),

    #[error("System command '{command}' failed: {reason}")]
    SystemCommandFailed { command: String, reason: String },

    #[error("vpc {vpc_id} is not safe to delete")]
    VpcNotSafeToDelete { vpc_id: String },

    #[error("certificate not found")]
    CertificateNotFound,

    #[error("failed to describe certificate")]
    CertificateDescriptionFailure,

    /// A failed AWS API call, `code` is the AWS error code when reported
    #[error("{operation} failed: {message}")]
    AwsRequest {
        operation: String,
        code: String,
        message: String,
    },

    /// Director deployment failed after producing output worth keeping
    #[error("{reason}")]
    BoshDeployFailed {
        output: Box<DeployOutput>,
        reason: String,
    },

    #[error("stack not found: {0}")]
    StackNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BblError>;
