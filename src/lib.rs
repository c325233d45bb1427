//! LSG Core - Backend logic for Lab Sequencer GUI
//!
//! This crate contains the run-sequencing and trace-editing logic with
//! zero UI dependencies. It can be used by the GUI application or a CLI
//! tool.
//!
//! The two independent pieces are the sequencer, which walks an ordered
//! run list and drives the external scan runner one entry at a time, and
//! the trace table, which presents named numeric traces as a spreadsheet
//! with synchronized row editing.
//!
//! # Example
//!
//! ```no_run
//! use lsg_core::cache::{ListLibrary, PersistedState, SessionStore};
//! use lsg_core::config::ConfigManager;
//! use lsg_core::sequencer::Sequencer;
//!
//! let mut config = ConfigManager::new(".config/settings.toml");
//! config.load_or_create().unwrap();
//! config.ensure_dirs_exist().unwrap();
//!
//! let store = SessionStore::new(config.state_file());
//! let state = store.load();
//!
//! let sequencer = Sequencer::new(state.run_list);
//! let library = ListLibrary::new(state.cache, state.master);
//!
//! // ... run the application event loop ...
//!
//! let (cache, master) = library.into_parts();
//! store
//!     .save(&PersistedState {
//!         run_list: sequencer.run_list().clone(),
//!         cache,
//!         master,
//!         ..PersistedState::default()
//!     })
//!     .unwrap();
//! ```

pub mod cache;
pub mod config;
pub mod logging;
pub mod run_list;
pub mod runner;
pub mod selection;
pub mod sequencer;
pub mod traces;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
