//! Persisted session state: the run list, the named-list cache, and the
//! master settings, read at startup and written at shutdown.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::run_list::RunList;

use super::library::{MasterSettings, SettingsCache};

/// Current session state format version.
const STATE_VERSION: u32 = 1;

/// Errors that can occur while persisting session state.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write session state: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize session state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the application persists between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    /// State format version.
    pub version: u32,
    /// The live run list.
    #[serde(default)]
    pub run_list: RunList,
    /// Named run-list snapshots.
    #[serde(default)]
    pub cache: SettingsCache,
    /// Current name and auto-save flag.
    #[serde(default)]
    pub master: MasterSettings,
    /// Opaque GUI geometry blob, stored for the widget layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gui_geometry: Option<serde_json::Value>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            run_list: RunList::default(),
            cache: SettingsCache::default(),
            master: MasterSettings::default(),
            gui_geometry: None,
        }
    }
}

/// Reads and writes the session state file.
pub struct SessionStore {
    state_file: PathBuf,
}

impl SessionStore {
    /// Create a store over the given state file path.
    pub fn new(state_file: impl Into<PathBuf>) -> Self {
        Self {
            state_file: state_file.into(),
        }
    }

    /// The state file path.
    pub fn path(&self) -> &Path {
        &self.state_file
    }

    /// Load the persisted state. A missing or unreadable file yields the
    /// defaults; a session must come up even when last session's state is
    /// gone or damaged.
    pub fn load(&self) -> PersistedState {
        if !self.state_file.exists() {
            return PersistedState::default();
        }
        match fs::read_to_string(&self.state_file) {
            Ok(content) => match serde_json::from_str::<PersistedState>(&content) {
                Ok(state) => {
                    tracing::info!(
                        "Loaded session state with {} entries, {} cached lists",
                        state.run_list.len(),
                        state.cache.len()
                    );
                    state
                }
                Err(e) => {
                    tracing::warn!("Failed to parse session state: {}", e);
                    PersistedState::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read session state: {}", e);
                PersistedState::default()
            }
        }
    }

    /// Persist the state atomically: write to a temp file in the same
    /// directory, then rename over the target.
    pub fn save(&self, state: &PersistedState) -> StoreResult<()> {
        if let Some(parent) = self.state_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(state)?;

        let temp_file = self.state_file.with_extension("json.tmp");
        fs::write(&temp_file, &json)?;
        fs::rename(&temp_file, &self.state_file)?;

        tracing::debug!("Saved session state to {}", self.state_file.display());
        Ok(())
    }
}
