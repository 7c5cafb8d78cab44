use super::credentials::Credentials;
use super::manifest::{self, MANIFEST_FILE_NAME, PRIVATE_KEY_FILE_NAME};
use crate::error::{BblError, Result};
use crate::state::types::BoshInitState;
use crate::traits::{BoshDeleter, BoshDeployer, DeployInput, DeployOutput, StringGenerator};
use crate::utils::command_exec::{require_binary, stream_success};
use crate::utils::private_file::write_private;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const BOSH_INIT_BINARY: &str = "bosh-init";
/// `bosh-init` keeps its state next to the manifest as `<manifest stem>-state.json`
const STATE_FILE_NAME: &str = "bosh-state.json";
/// Compiling releases on a fresh director takes a while
const BOSH_INIT_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Scratch directory holding everything a single `bosh-init` run needs
pub(crate) struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub(crate) fn prepare(manifest: &str, state: &BoshInitState, private_key: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("bbl-bosh-").tempdir()?;
        let workspace = Self { dir };

        write_file(&workspace.manifest_path(), manifest.as_bytes())?;
        write_file(
            &workspace.path(PRIVATE_KEY_FILE_NAME),
            private_key.as_bytes(),
        )?;
        if !state.is_empty() {
            let content = serde_json::to_vec_pretty(state)?;
            write_file(&workspace.state_path(), &content)?;
        }
        Ok(workspace)
    }

    pub(crate) fn manifest_path(&self) -> PathBuf {
        self.path(MANIFEST_FILE_NAME)
    }

    pub(crate) fn state_path(&self) -> PathBuf {
        self.path(STATE_FILE_NAME)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// State left behind by the run; empty when none was written
    pub(crate) fn read_state(&self) -> Result<BoshInitState> {
        let path = self.state_path();
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                BblError::SerializationError(format!(
                    "invalid bosh-init state in {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BoshInitState::new()),
            Err(e) => Err(BblError::IoError { path, source: e }),
        }
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    write_private(path, contents).map_err(|e| BblError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Deploys and deletes the director with `bosh-init`
pub struct BoshInitExecutor {
    strings: Arc<dyn StringGenerator>,
}

impl BoshInitExecutor {
    pub fn new(strings: Arc<dyn StringGenerator>) -> Self {
        Self { strings }
    }

    fn run(&self, action: &str, workspace: &Workspace) -> Result<()> {
        let binary = require_binary(BOSH_INIT_BINARY)?;
        let mut cmd = Command::new(binary);
        cmd.arg(action).arg(workspace.manifest_path());

        stream_success(
            &mut cmd,
            &format!("{} {}", BOSH_INIT_BINARY, action),
            BOSH_INIT_TIMEOUT,
        )
    }
}

impl BoshDeployer for BoshInitExecutor {
    fn deploy(&self, input: DeployInput) -> Result<DeployOutput> {
        let credentials =
            Credentials::from_map(&input.credentials)?.fill_missing(self.strings.as_ref())?;
        let manifest = manifest::render(&input, &credentials)?;

        let workspace = Workspace::prepare(&manifest, &input.state, &input.key_pair.private_key)?;
        if let Err(err) = self.run("deploy", &workspace) {
            return Err(partial_deploy_failure(
                &workspace,
                manifest,
                &credentials,
                input.state,
                err,
            ));
        }

        Ok(DeployOutput {
            manifest,
            state: workspace.read_state()?,
            credentials: credentials.to_map()?,
        })
    }
}

/// Keep whatever `bosh-init` recorded before it failed, so the caller can
/// persist it and a retry resumes the same director.
pub(crate) fn partial_deploy_failure(
    workspace: &Workspace,
    manifest: String,
    credentials: &Credentials,
    previous_state: BoshInitState,
    err: BblError,
) -> BblError {
    let credentials = match credentials.to_map() {
        Ok(credentials) => credentials,
        Err(_) => return err,
    };
    let state = workspace.read_state().unwrap_or(previous_state);

    BblError::BoshDeployFailed {
        output: Box::new(DeployOutput {
            manifest,
            state,
            credentials,
        }),
        reason: err.to_string(),
    }
}

impl BoshDeleter for BoshInitExecutor {
    fn delete(&self, manifest: &str, state: &BoshInitState, ec2_private_key: &str) -> Result<()> {
        // Nothing recorded means the director was never deployed.
        if manifest.is_empty() && state.is_empty() {
            return Ok(());
        }

        let workspace = Workspace::prepare(manifest, state, ec2_private_key)?;
        self.run("delete", &workspace)
    }
}

#[cfg(test)]
mod tests;
