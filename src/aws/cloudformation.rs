//! Network stack lifecycle through CloudFormation

use super::cli::{AwsCli, error_code};
use super::template::{self, KEY_PAIR_PARAMETER};
use crate::error::{BblError, Result};
use crate::traits::{InfrastructureManager, Stack, StackManager};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

const SERVICE: &str = "cloudformation";
const NO_UPDATES_MESSAGE: &str = "No updates are to be performed";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeStacksOutput {
    #[serde(default)]
    stacks: Vec<StackDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackDescription {
    stack_name: String,
    #[serde(default)]
    stack_status: String,
    #[serde(default)]
    outputs: Vec<StackOutput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackOutput {
    output_key: String,
    #[serde(default)]
    output_value: String,
}

pub struct CloudFormation {
    cli: Arc<AwsCli>,
}

impl CloudFormation {
    pub fn new(cli: Arc<AwsCli>) -> Self {
        Self { cli }
    }

    fn apply(&self, operation: &str, key_pair_name: &str, stack_name: &str) -> Result<()> {
        let body = serde_json::to_string(&template::render())?;
        let parameter = format!(
            "ParameterKey={},ParameterValue={}",
            KEY_PAIR_PARAMETER, key_pair_name
        );
        self.cli.call(
            SERVICE,
            operation,
            &[
                "--stack-name",
                stack_name,
                "--capabilities",
                "CAPABILITY_IAM",
                "--template-body",
                &body,
                "--parameters",
                &parameter,
            ],
        )?;
        Ok(())
    }
}

impl StackManager for CloudFormation {
    fn describe(&self, stack_name: &str) -> Result<Stack> {
        let response = self
            .cli
            .call(SERVICE, "describe-stacks", &["--stack-name", stack_name])
            .map_err(|err| classify_describe_error(err, stack_name))?;
        parse_stack(response, stack_name)
    }
}

impl InfrastructureManager for CloudFormation {
    fn create(&self, key_pair_name: &str, stack_name: &str) -> Result<Stack> {
        if self.exists(stack_name)? {
            match self.apply("update-stack", key_pair_name, stack_name) {
                Ok(()) => {
                    self.cli
                        .wait(SERVICE, "stack-update-complete", &["--stack-name", stack_name])?;
                }
                Err(err) if is_no_op_update(&err) => {}
                Err(err) => return Err(err),
            }
        } else {
            self.apply("create-stack", key_pair_name, stack_name)?;
            self.cli
                .wait(SERVICE, "stack-create-complete", &["--stack-name", stack_name])?;
        }

        self.describe(stack_name)
    }

    fn exists(&self, stack_name: &str) -> Result<bool> {
        match self.describe(stack_name) {
            Ok(_) => Ok(true),
            Err(BblError::StackNotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn delete(&self, stack_name: &str) -> Result<()> {
        if !self.exists(stack_name)? {
            return Ok(());
        }

        self.cli
            .call(SERVICE, "delete-stack", &["--stack-name", stack_name])?;
        self.cli
            .wait(SERVICE, "stack-delete-complete", &["--stack-name", stack_name])
    }
}

/// Convert a `describe-stacks` response into a [`Stack`]
pub(crate) fn parse_stack(response: Value, stack_name: &str) -> Result<Stack> {
    let output: DescribeStacksOutput = serde_json::from_value(response)?;
    let description = output
        .stacks
        .into_iter()
        .next()
        .ok_or_else(|| BblError::StackNotFound(stack_name.to_string()))?;

    Ok(Stack {
        name: description.stack_name,
        status: description.stack_status,
        outputs: description
            .outputs
            .into_iter()
            .map(|output| (output.output_key, output.output_value))
            .collect(),
    })
}

pub(crate) fn classify_describe_error(err: BblError, stack_name: &str) -> BblError {
    match &err {
        BblError::AwsRequest { code, message, .. }
            if code == "ValidationError" && message.contains("does not exist") =>
        {
            BblError::StackNotFound(stack_name.to_string())
        }
        _ => err,
    }
}

pub(crate) fn is_no_op_update(err: &BblError) -> bool {
    matches!(
        err,
        BblError::AwsRequest { message, .. } if message.contains(NO_UPDATES_MESSAGE)
    ) && error_code(err) == Some("ValidationError")
}
