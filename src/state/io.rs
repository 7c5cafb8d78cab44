use crate::error::{BblError, Result};
use crate::project_identity;
use crate::state::types::State;
use crate::traits::StateStore;
use crate::ui;
use crate::utils::private_file::write_private;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub(crate) const CURRENT_STATE_SCHEMA_VERSION: u32 = 1;

pub fn state_file_path(dir: &Path) -> PathBuf {
    dir.join(project_identity::STATE_FILE_NAME)
}

/// Load the state recorded in `dir`.
///
/// A missing file is reported as [`BblError::StateNotFound`] so callers can
/// tell "no environment here" apart from an unreadable file.
pub fn load_state(dir: &Path) -> Result<State> {
    let path = state_file_path(dir);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(BblError::StateNotFound {
                dir: dir.to_path_buf(),
            });
        }
        Err(e) => return Err(BblError::IoError { path, source: e }),
    };

    let state: State = serde_json::from_str(&content).map_err(|e| {
        BblError::SerializationError(format!("State file {} is invalid: {}", path.display(), e))
    })?;

    if state.version > CURRENT_STATE_SCHEMA_VERSION {
        return Err(BblError::UnsupportedStateVersion {
            path,
            found: state.version,
            supported: CURRENT_STATE_SCHEMA_VERSION,
        });
    }

    Ok(state)
}

/// Write `state` into `dir`, stamped with the current schema version.
///
/// The document lands in `bbl-state.json.tmp` first and is renamed over the
/// state file, so a failed write leaves the previous state readable.
pub fn save_state(dir: &Path, state: &State) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| BblError::IoError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut stamped = state.clone();
    stamped.version = CURRENT_STATE_SCHEMA_VERSION;
    let content = serde_json::to_string_pretty(&stamped)
        .map_err(|e| BblError::SerializationError(format!("State serialization: {}", e)))?;

    let path = state_file_path(dir);
    let tmp_path = path.with_extension("json.tmp");
    // A leftover from an interrupted save would keep its old permissions.
    let _ = fs::remove_file(&tmp_path);
    write_private(&tmp_path, content.as_bytes()).map_err(|e| BblError::IoError {
        path: tmp_path.clone(),
        source: e,
    })?;
    fs::rename(&tmp_path, &path).map_err(|e| BblError::IoError { path, source: e })?;

    // The rename is durable only once the directory entry is flushed.
    if let Err(e) = fs::File::open(dir).and_then(|dir_file| dir_file.sync_all()) {
        ui::warning(&format!("Failed to sync state directory: {}", e));
    }

    Ok(())
}

/// Filesystem-based state store bound to one state directory
#[derive(Debug, Clone)]
pub struct FilesystemStateStore {
    dir: PathBuf,
}

impl FilesystemStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StateStore for FilesystemStateStore {
    fn load(&self) -> Result<State> {
        load_state(&self.dir)
    }

    fn save(&self, state: &State) -> Result<()> {
        save_state(&self.dir, state)
    }
}

#[cfg(test)]
mod tests;
