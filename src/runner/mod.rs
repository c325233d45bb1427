//! External scan-runner contract.
//!
//! The runner is the service that actually executes a scan on instrument
//! hardware. The sequencer drives it fire-and-forget: it loads an entry's
//! selections, calls `start`, and is told about completion later through a
//! `measurement finished` notification routed back by the embedding
//! application. This module only defines the in-process boundary; the real
//! implementation lives with the instrument code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Snapshot of the runner's active selection, saved when a sequence starts
/// and restored when it returns to idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfiguration {
    /// Active scan module name.
    pub scan: Option<String>,
    /// Loaded measurement setting name.
    pub measurement: Option<String>,
    /// Loaded evaluation setting name.
    pub evaluation: Option<String>,
    /// Loaded analysis configuration name.
    pub analysis: Option<String>,
}

/// Contract the sequencer holds against the instrument side.
///
/// All calls are fire-and-forget; the runner reports completion through
/// the embedding application's notification path, not through return
/// values here.
pub trait ScanRunner {
    /// Whether the runner is idle and ready to accept a new start.
    fn current_idle_status(&self) -> bool;

    /// The currently loaded scan/measurement/evaluation/analysis selection.
    fn current_configuration(&self) -> RunnerConfiguration;

    /// Switch the active scan context.
    fn select_scan(&mut self, name: &str);

    /// Load a measurement setting by name.
    fn load_measurement_setting(&mut self, name: &str);

    /// Load an evaluation setting by name.
    fn load_evaluation_setting(&mut self, name: &str);

    /// Load an analysis configuration by name. An empty name means no
    /// analysis; implementations must tolerate it.
    fn load_analysis_configuration(&mut self, name: &str);

    /// Start the loaded scan with the given settings pairs.
    fn start(&mut self, settings: &[(String, f64)]);
}

/// Selections one scan module offers for entry construction.
#[derive(Debug, Clone, Default)]
pub struct ModuleSelections {
    /// Measurement setting names, sorted.
    pub measurements: Vec<String>,
    /// Evaluation setting names, sorted.
    pub evaluations: Vec<String>,
    /// Analysis configuration names, sorted.
    pub analyses: Vec<String>,
}

/// Catalog of the scan modules known to the application and the
/// measurement/evaluation/analysis names each one offers.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: BTreeMap<String, ModuleSelections>,
}

impl ModuleCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scan module's selections. Name lists are sorted for
    /// display; registering an existing module replaces its selections.
    pub fn insert_module(&mut self, name: impl Into<String>, mut selections: ModuleSelections) {
        selections.measurements.sort();
        selections.evaluations.sort();
        selections.analyses.sort();
        self.modules.insert(name.into(), selections);
    }

    /// Look up one module's selections.
    pub fn module(&self, name: &str) -> Option<&ModuleSelections> {
        self.modules.get(name)
    }

    /// Module names, sorted.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    /// Whether the module offers the named measurement.
    pub fn has_measurement(&self, module: &str, measurement: &str) -> bool {
        self.modules
            .get(module)
            .is_some_and(|m| m.measurements.iter().any(|name| name == measurement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_sorts_names() {
        let mut catalog = ModuleCatalog::new();
        catalog.insert_module(
            "ions",
            ModuleSelections {
                measurements: vec!["rabi".to_string(), "flop".to_string()],
                evaluations: vec!["parity".to_string(), "mean".to_string()],
                analyses: vec![],
            },
        );
        catalog.insert_module("cavity", ModuleSelections::default());

        assert_eq!(catalog.module_names(), vec!["cavity", "ions"]);
        let ions = catalog.module("ions").unwrap();
        assert_eq!(ions.measurements, vec!["flop", "rabi"]);
        assert_eq!(ions.evaluations, vec!["mean", "parity"]);
    }

    #[test]
    fn catalog_lookup() {
        let mut catalog = ModuleCatalog::new();
        catalog.insert_module(
            "ions",
            ModuleSelections {
                measurements: vec!["rabi".to_string()],
                ..ModuleSelections::default()
            },
        );
        assert!(catalog.has_measurement("ions", "rabi"));
        assert!(!catalog.has_measurement("ions", "flop"));
        assert!(!catalog.has_measurement("cavity", "rabi"));
    }

    #[test]
    fn configuration_equality_is_structural() {
        let a = RunnerConfiguration {
            scan: Some("ions".to_string()),
            measurement: Some("rabi".to_string()),
            evaluation: None,
            analysis: None,
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
