//! Named run-list snapshots and the save/load policy around them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::run_list::RunList;

/// A cached run list with the time it was saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedListData {
    /// Deep copy of the run list at save time.
    pub run_list: RunList,
    /// ISO timestamp when the snapshot was saved.
    pub saved_timestamp: String,
}

impl SavedListData {
    /// Snapshot a run list with the current timestamp.
    pub fn new(run_list: RunList) -> Self {
        Self {
            run_list,
            saved_timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Name → snapshot mapping. A name maps to exactly one snapshot; saving
/// under an existing name overwrites it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsCache {
    entries: BTreeMap<String, SavedListData>,
}

impl SettingsCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep copy a snapshot out of the cache.
    pub fn get(&self, name: &str) -> Option<RunList> {
        self.entries.get(name).map(|saved| saved.run_list.clone())
    }

    /// The stored snapshot, for comparison against the live list.
    pub fn snapshot(&self, name: &str) -> Option<&SavedListData> {
        self.entries.get(name)
    }

    /// Deep copy a run list into the cache, overwriting any existing
    /// snapshot of the same name.
    pub fn put(&mut self, name: impl Into<String>, run_list: &RunList) {
        self.entries
            .insert(name.into(), SavedListData::new(run_list.clone()));
    }

    /// Remove a snapshot. Returns whether it existed.
    pub fn delete(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Whether a snapshot of this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Snapshot names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which named list is current and whether saving happens automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterSettings {
    /// Name of the list the live settings were last saved to or loaded
    /// from.
    #[serde(default)]
    pub current_setting_name: Option<String>,
    /// Save automatically whenever the live list drifts from its snapshot.
    #[serde(default)]
    pub auto_save: bool,
}

/// The named-list library: cache plus master settings plus the savable
/// policy that drives the save button.
#[derive(Debug, Clone, Default)]
pub struct ListLibrary {
    cache: SettingsCache,
    master: MasterSettings,
}

impl ListLibrary {
    /// Assemble the library from its persisted parts.
    pub fn new(cache: SettingsCache, master: MasterSettings) -> Self {
        Self { cache, master }
    }

    /// Split back into the persisted parts.
    pub fn into_parts(self) -> (SettingsCache, MasterSettings) {
        (self.cache, self.master)
    }

    /// The snapshot cache.
    pub fn cache(&self) -> &SettingsCache {
        &self.cache
    }

    /// The master settings.
    pub fn master(&self) -> &MasterSettings {
        &self.master
    }

    /// Enable or disable auto-save.
    pub fn set_auto_save(&mut self, auto_save: bool) {
        self.master.auto_save = auto_save;
    }

    /// Whether saving `live` under `name` would change anything: the name
    /// is non-empty and either is not the current one, has no snapshot yet,
    /// or its snapshot differs from the live list.
    pub fn is_savable(&self, name: &str, live: &RunList) -> bool {
        if name.is_empty() {
            return false;
        }
        self.master.current_setting_name.as_deref() != Some(name)
            || !self.cache.contains(name)
            || self
                .cache
                .snapshot(name)
                .map(|saved| saved.run_list != *live)
                .unwrap_or(true)
    }

    /// Savable check with the auto-save policy applied: when auto-save is
    /// on and the list is savable, it is saved immediately and the save
    /// button stays disabled. Returns whether the save button should be
    /// enabled.
    pub fn check_savable(&mut self, name: &str, live: &RunList) -> bool {
        let mut savable = self.is_savable(name, live);
        if savable && self.master.auto_save {
            self.save(name, live);
            savable = false;
        }
        savable
    }

    /// Save the live list under `name` if it is new or differs from the
    /// existing snapshot. Returns whether the name is new to the cache.
    pub fn save(&mut self, name: &str, live: &RunList) -> bool {
        if name.is_empty() {
            return false;
        }
        let new = !self.cache.contains(name);
        let differs = self
            .cache
            .snapshot(name)
            .map(|saved| saved.run_list != *live)
            .unwrap_or(true);
        if new || differs {
            self.cache.put(name, live);
            self.master.current_setting_name = Some(name.to_string());
        }
        new
    }

    /// Load a deep copy of a named snapshot and make it the current name.
    pub fn load(&mut self, name: &str) -> Option<RunList> {
        let list = self.cache.get(name)?;
        self.master.current_setting_name = Some(name.to_string());
        Some(list)
    }

    /// Delete a named snapshot.
    pub fn delete(&mut self, name: &str) -> bool {
        self.cache.delete(name)
    }

    /// Snapshot names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.cache.names()
    }
}
