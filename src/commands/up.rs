use crate::bosh::manifest;
use crate::commands::{Command, aws_config, flag_usage, parse_flags};
use crate::error::{BblError, Result};
use crate::project_identity;
use crate::state::types::{Aws, State};
use crate::traits::{
    BoshDeployer, ClientConfigurator, DeployInput, DeployOutput, InfrastructureManager,
    InfrastructureOutputs, KeyPairSynchronizer, SslKeyPair, SslKeyPairGenerator, Stack, StateStore,
    StringGenerator, stack_outputs,
};
use crate::ui::Logger;
use clap::Parser;
use std::sync::Arc;

const DIRECTOR_NAME: &str = "my-bosh";
const NAME_SUFFIX_LENGTH: usize = 7;
const PASSWORD_LENGTH: usize = 15;

#[derive(Parser, Debug)]
#[command(
    name = "up",
    about = "Deploys a BOSH director on AWS",
    no_binary_name = true,
    disable_help_flag = true
)]
struct UpArgs {
    /// AWS access key ID to use
    #[arg(long, env = "BBL_AWS_ACCESS_KEY_ID", hide_env_values = true)]
    aws_access_key_id: Option<String>,

    /// AWS secret access key to use
    #[arg(long, env = "BBL_AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    aws_secret_access_key: Option<String>,

    /// AWS region to use
    #[arg(long, env = "BBL_AWS_REGION")]
    aws_region: Option<String>,
}

pub struct Up {
    logger: Arc<dyn Logger>,
    client_configurator: Arc<dyn ClientConfigurator>,
    key_pair_synchronizer: Arc<dyn KeyPairSynchronizer>,
    infrastructure_manager: Arc<dyn InfrastructureManager>,
    string_generator: Arc<dyn StringGenerator>,
    ssl_key_pair_generator: Arc<dyn SslKeyPairGenerator>,
    bosh_deployer: Arc<dyn BoshDeployer>,
    state_store: Arc<dyn StateStore>,
}

impl Up {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        logger: Arc<dyn Logger>,
        client_configurator: Arc<dyn ClientConfigurator>,
        key_pair_synchronizer: Arc<dyn KeyPairSynchronizer>,
        infrastructure_manager: Arc<dyn InfrastructureManager>,
        string_generator: Arc<dyn StringGenerator>,
        ssl_key_pair_generator: Arc<dyn SslKeyPairGenerator>,
        bosh_deployer: Arc<dyn BoshDeployer>,
        state_store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            logger,
            client_configurator,
            key_pair_synchronizer,
            infrastructure_manager,
            string_generator,
            ssl_key_pair_generator,
            bosh_deployer,
            state_store,
        }
    }

    /// Persist progress so a retry reuses what already exists.
    fn commit(&self, state: &State) -> Result<()> {
        self.state_store.save(state)
    }

    fn generate_if_empty(&self, value: &mut String, prefix: &str, length: usize) -> Result<bool> {
        if !value.is_empty() {
            return Ok(false);
        }
        *value = self.string_generator.generate(prefix, length)?;
        Ok(true)
    }
}

impl Command for Up {
    fn execute(&self, subcommand_flags: &[String], state: State) -> Result<State> {
        let args: UpArgs = parse_flags(subcommand_flags)?;
        let mut state = state;

        state.aws = resolve_credentials(&state, args)?;
        self.client_configurator.set_config(aws_config(&state.aws));
        self.commit(&state)?;

        if self.generate_if_empty(&mut state.key_pair.name, "keypair-", NAME_SUFFIX_LENGTH)? {
            self.commit(&state)?;
        }
        self.logger.step("checking EC2 key pair");
        state.key_pair = self.key_pair_synchronizer.sync(state.key_pair.clone())?;
        self.commit(&state)?;

        if self.generate_if_empty(&mut state.stack.name, "stack-", NAME_SUFFIX_LENGTH)? {
            self.commit(&state)?;
        }
        self.logger.step("applying CloudFormation stack");
        let stack = self
            .infrastructure_manager
            .create(&state.key_pair.name, &state.stack.name)?;
        let infrastructure = infrastructure_outputs(&stack)?;

        let bosh = &mut state.bosh;
        let mut generated = self.generate_if_empty(
            &mut bosh.director_username,
            "user-",
            NAME_SUFFIX_LENGTH,
        )?;
        generated |= self.generate_if_empty(&mut bosh.director_password, "p-", PASSWORD_LENGTH)?;
        if bosh.director_ssl_certificate.is_empty() || bosh.director_ssl_private_key.is_empty() {
            self.logger.step("generating director TLS certificate");
            let ssl = self
                .ssl_key_pair_generator
                .generate(&infrastructure.elastic_ip)?;
            bosh.director_ssl_certificate = ssl.certificate;
            bosh.director_ssl_private_key = ssl.private_key;
            generated = true;
        }
        if generated {
            self.commit(&state)?;
        }

        self.logger.step("deploying BOSH director");
        let deployed = self.bosh_deployer.deploy(DeployInput {
            director_name: DIRECTOR_NAME.to_string(),
            director_username: state.bosh.director_username.clone(),
            director_password: state.bosh.director_password.clone(),
            region: state.aws.region.clone(),
            infrastructure: infrastructure.clone(),
            key_pair: state.key_pair.clone(),
            ssl_key_pair: SslKeyPair {
                certificate: state.bosh.director_ssl_certificate.clone(),
                private_key: state.bosh.director_ssl_private_key.clone(),
            },
            state: state.bosh.state.clone(),
            credentials: state.bosh.credentials.clone(),
        });
        let output = match deployed {
            Ok(output) => output,
            Err(BblError::BoshDeployFailed { output, reason }) => {
                record_deployment(&mut state, *output.clone());
                self.commit(&state)?;
                return Err(BblError::BoshDeployFailed { output, reason });
            }
            Err(err) => return Err(err),
        };
        record_deployment(&mut state, output);
        self.commit(&state)?;

        self.logger.println(&format!(
            "Director Address:  {}",
            manifest::director_url(&infrastructure.elastic_ip)
        ));
        self.logger
            .println(&format!("Director Username: {}", state.bosh.director_username));
        self.logger
            .println(&format!("Director Password: {}", state.bosh.director_password));

        Ok(state)
    }

    fn usage(&self) -> String {
        flag_usage::<UpArgs>()
    }
}

fn record_deployment(state: &mut State, output: DeployOutput) {
    state.bosh.manifest = output.manifest;
    state.bosh.state = output.state;
    state.bosh.credentials = output.credentials;
}

/// Merge flag credentials over the ones recorded in state.
fn resolve_credentials(state: &State, args: UpArgs) -> Result<Aws> {
    let mut aws = state.aws.clone();
    let provided = |value: Option<String>| value.filter(|v| !v.is_empty());

    if let Some(region) = provided(args.aws_region) {
        if !state.stack.name.is_empty() && !aws.region.is_empty() && aws.region != region {
            return Err(BblError::Other(
                "The region cannot be changed for an existing environment.".to_string(),
            ));
        }
        aws.region = region;
    }
    if let Some(access_key_id) = provided(args.aws_access_key_id) {
        aws.access_key_id = access_key_id;
    }
    if let Some(secret_access_key) = provided(args.aws_secret_access_key) {
        aws.secret_access_key = secret_access_key;
    }

    if !aws.is_complete() {
        let missing: Vec<&str> = [
            ("--aws-access-key-id", &aws.access_key_id),
            ("--aws-secret-access-key", &aws.secret_access_key),
            ("--aws-region", &aws.region),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(flag, _)| flag)
        .collect();
        return Err(BblError::Flag(format!(
            "AWS credentials must be provided: {} (or set {})",
            missing.join(", "),
            project_identity::env_key("AWS_*")
        )));
    }

    Ok(aws)
}

fn infrastructure_outputs(stack: &Stack) -> Result<InfrastructureOutputs> {
    let required = |key: &str| -> Result<String> {
        let value = stack.output(key);
        if value.is_empty() {
            return Err(BblError::Other(format!(
                "stack {} did not report output {}",
                stack.name, key
            )));
        }
        Ok(value.to_string())
    };

    Ok(InfrastructureOutputs {
        subnet_id: required(stack_outputs::SUBNET)?,
        availability_zone: required(stack_outputs::SUBNET_AZ)?,
        elastic_ip: required(stack_outputs::ELASTIC_IP)?,
        access_key_id: required(stack_outputs::USER_ACCESS_KEY)?,
        secret_access_key: required(stack_outputs::USER_SECRET_ACCESS_KEY)?,
        security_group: required(stack_outputs::SECURITY_GROUP)?,
    })
}
