//! Named-settings cache and session persistence.
//!
//! This module provides:
//! - `SettingsCache`: named, timestamped deep copies of the run list
//! - `MasterSettings`: current list name and the auto-save flag
//! - `ListLibrary`: the save/load/savable policy over cache + master
//! - `SessionStore` / `PersistedState`: the JSON session state read at
//!   startup and written at shutdown
//!
//! Cache entries are immutable snapshots: lists are deep-copied on the way
//! in and on the way out, so live state never aliases a cached one.

mod library;
mod store;

pub use library::{ListLibrary, MasterSettings, SavedListData, SettingsCache};
pub use store::{PersistedState, SessionStore, StoreError, StoreResult};
