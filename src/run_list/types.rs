//! Run-list entry types and data structures.

use serde::{Deserialize, Serialize};

/// Ordered mapping of setting name to value, as handed to the scan runner.
///
/// Insertion order is preserved for display and for the `(name, value)`
/// pairs passed to `start()`. Equality ignores the order, so two entries
/// that set the same values through a different edit history compare equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsMap(Vec<(String, f64)>);

impl SettingsMap {
    /// Create an empty settings map.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set a value, replacing an existing entry of the same name in place.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(pair) => pair.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Get a value by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Remove a setting by name. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|(n, _)| n != name);
        self.0.len() != before
    }

    /// The `(name, value)` pairs in insertion order.
    pub fn pairs(&self) -> &[(String, f64)] {
        &self.0
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no settings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for SettingsMap {
    fn eq(&self, other: &Self) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        let sorted = |map: &SettingsMap| {
            let mut pairs = map.0.clone();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            pairs
        };
        sorted(self) == sorted(other)
    }
}

impl FromIterator<(String, f64)> for SettingsMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.set(name, value);
        }
        map
    }
}

/// One queued job: a scan with its measurement, evaluation, and analysis
/// selections plus per-entry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEntry {
    /// Scan module this entry runs under.
    pub scan: Option<String>,
    /// Measurement setting name.
    pub measurement: Option<String>,
    /// Evaluation setting name.
    pub evaluation: Option<String>,
    /// Analysis configuration name. May be absent; the runner then
    /// receives an empty configuration.
    pub analysis: Option<String>,
    /// Whether the entry participates in a sequence run.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Halt the sequence after this entry completes.
    #[serde(default)]
    pub stop_flag: bool,
    /// Settings applied for the duration of this entry's run.
    #[serde(default)]
    pub settings: SettingsMap,
    /// Opaque scan segment definition carried for the scan runner.
    #[serde(default)]
    pub scan_segment: serde_json::Value,
}

fn default_true() -> bool {
    true
}

impl RunEntry {
    /// Create a new enabled entry from the current selection boxes.
    pub fn new(
        scan: impl Into<String>,
        measurement: impl Into<String>,
        evaluation: impl Into<String>,
        analysis: impl Into<String>,
    ) -> Self {
        Self {
            scan: Some(scan.into()),
            measurement: Some(measurement.into()),
            evaluation: Some(evaluation.into()),
            analysis: Some(analysis.into()),
            ..Self::default()
        }
    }

    /// Display label, "measurement - evaluation".
    pub fn display_label(&self) -> String {
        format!(
            "{} - {}",
            self.measurement.as_deref().unwrap_or(""),
            self.evaluation.as_deref().unwrap_or("")
        )
    }
}

impl Default for RunEntry {
    fn default() -> Self {
        Self {
            scan: None,
            measurement: None,
            evaluation: None,
            analysis: None,
            enabled: true,
            stop_flag: false,
            settings: SettingsMap::new(),
            scan_segment: serde_json::Value::Null,
        }
    }
}

// Equality over the state fields only; the scan segment blob is carried
// for the runner but does not participate in change detection.
impl PartialEq for RunEntry {
    fn eq(&self, other: &Self) -> bool {
        self.scan == other.scan
            && self.measurement == other.measurement
            && self.evaluation == other.evaluation
            && self.analysis == other.analysis
            && self.settings == other.settings
            && self.enabled == other.enabled
            && self.stop_flag == other.stop_flag
    }
}

/// Direction for moving selected rows by one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    /// Index delta for this direction.
    pub fn delta(&self) -> isize {
        match self {
            MoveDirection::Up => -1,
            MoveDirection::Down => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_map_preserves_insertion_order() {
        let mut map = SettingsMap::new();
        map.set("gate_time", 0.1);
        map.set("amplitude", 2.5);
        map.set("gate_time", 0.2);

        let names: Vec<&str> = map.pairs().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["gate_time", "amplitude"]);
        assert_eq!(map.get("gate_time"), Some(0.2));
    }

    #[test]
    fn settings_map_equality_ignores_order() {
        let a: SettingsMap = [("x".to_string(), 1.0), ("y".to_string(), 2.0)]
            .into_iter()
            .collect();
        let b: SettingsMap = [("y".to_string(), 2.0), ("x".to_string(), 1.0)]
            .into_iter()
            .collect();
        assert_eq!(a, b);

        let c: SettingsMap = [("x".to_string(), 1.0)].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn entry_equality_excludes_scan_segment() {
        let mut a = RunEntry::new("ions", "rabi", "mean", "fit");
        let mut b = a.clone();
        b.scan_segment = serde_json::json!({ "steps": 100 });
        assert_eq!(a, b);

        a.stop_flag = true;
        assert_ne!(a, b);
    }

    #[test]
    fn entry_defaults_enabled() {
        let entry = RunEntry::new("ions", "rabi", "mean", "fit");
        assert!(entry.enabled);
        assert!(!entry.stop_flag);
    }

    #[test]
    fn entry_deserializes_with_missing_flags() {
        let json = r#"{"scan": "ions", "measurement": "rabi", "evaluation": null, "analysis": null}"#;
        let entry: RunEntry = serde_json::from_str(json).unwrap();
        assert!(entry.enabled);
        assert!(!entry.stop_flag);
        assert!(entry.settings.is_empty());
    }
}
