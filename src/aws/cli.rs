use crate::error::{BblError, Result};
use crate::traits::{AwsConfig, ClientConfigurator};
use crate::utils::command_exec::{capture, require_binary};
use serde_json::Value;
use std::process::Command;
use std::sync::Mutex;
use std::time::Duration;

const AWS_BINARY: &str = "aws";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
/// CloudFormation waiters poll for up to an hour
const WAIT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Runs `aws <service> <operation>` with the configured identity
pub struct AwsCli {
    endpoint_override: String,
    config: Mutex<AwsConfig>,
}

impl AwsCli {
    pub fn new(endpoint_override: impl Into<String>) -> Self {
        Self {
            endpoint_override: endpoint_override.into(),
            config: Mutex::new(AwsConfig::default()),
        }
    }

    /// Run an API call and parse its JSON output (`Null` when silent).
    pub fn call(&self, service: &str, operation: &str, args: &[&str]) -> Result<Value> {
        self.run(service, operation, args, DEFAULT_TIMEOUT)
    }

    /// Run a `wait` subcommand, which blocks until the resource settles.
    pub fn wait(&self, service: &str, condition: &str, args: &[&str]) -> Result<()> {
        let mut wait_args = vec![condition];
        wait_args.extend_from_slice(args);
        self.run(service, "wait", &wait_args, WAIT_TIMEOUT)
            .map(|_| ())
    }

    fn run(&self, service: &str, operation: &str, args: &[&str], timeout: Duration) -> Result<Value> {
        let mut cmd = self.command(service, operation, args)?;
        let output = capture(&mut cmd, timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(request_error(service, operation, &stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&stdout)?)
    }

    fn command(&self, service: &str, operation: &str, args: &[&str]) -> Result<Command> {
        let binary = require_binary(AWS_BINARY)?;
        let config = self
            .config
            .lock()
            .map_err(|_| BblError::Internal("aws config lock poisoned".to_string()))?
            .clone();

        let mut cmd = Command::new(binary);
        cmd.arg(service)
            .arg(operation)
            .args(args)
            .args(["--output", "json"])
            .env("AWS_ACCESS_KEY_ID", &config.access_key_id)
            .env("AWS_SECRET_ACCESS_KEY", &config.secret_access_key)
            .env("AWS_DEFAULT_REGION", &config.region)
            .env("AWS_PAGER", "");
        if !config.region.is_empty() {
            cmd.args(["--region", config.region.as_str()]);
        }
        if !self.endpoint_override.is_empty() {
            cmd.args(["--endpoint-url", self.endpoint_override.as_str()]);
        }
        Ok(cmd)
    }
}

impl ClientConfigurator for AwsCli {
    fn set_config(&self, config: AwsConfig) {
        match self.config.lock() {
            Ok(mut current) => *current = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }
}

/// Turn `An error occurred (Code) when calling the Op operation: message`
/// into a structured error.
pub(crate) fn request_error(service: &str, operation: &str, stderr: &str) -> BblError {
    let stderr = stderr.trim();
    let (code, message) = match stderr
        .split_once("An error occurred (")
        .and_then(|(_, rest)| rest.split_once(')'))
    {
        Some((code, rest)) => {
            let message = rest
                .split_once(": ")
                .map(|(_, message)| message)
                .unwrap_or(rest);
            (code.to_string(), message.trim().to_string())
        }
        None => (String::new(), stderr.to_string()),
    };

    BblError::AwsRequest {
        operation: format!("{} {}", service, operation),
        code,
        message,
    }
}

/// AWS error code of a failed call, if any
pub(crate) fn error_code(err: &BblError) -> Option<&str> {
    match err {
        BblError::AwsRequest { code, .. } => Some(code.as_str()),
        _ => None,
    }
}
