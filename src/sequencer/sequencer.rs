//! The sequencer: owns the run list and drives the scan runner.

use std::sync::Arc;

use crate::logging::RunLogger;
use crate::run_list::{RunEntry, RunList};
use crate::runner::{RunnerConfiguration, ScanRunner};
use crate::selection::unique_rows;

use super::state::{next_transition, Effect, GuardInputs, SequenceEvent, SequenceState};

/// The entry currently highlighted in the table, and whether it is the
/// one executing right now (as opposed to merely being under the cursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveRow {
    /// Row index of the highlighted entry.
    pub index: usize,
    /// True while that entry is executing on the runner.
    pub running: bool,
}

/// Drives the Idle→Running→Idle cycle over the run list.
///
/// The sequencer is the single owner of the `RunList`; user edits go
/// through `run_list_mut` between events, and no event is processed while
/// another transition's effects are executing (all entry points take
/// `&mut self`). The runner is started fire-and-forget; completion comes
/// back through `on_runner_state_changed`.
pub struct Sequencer {
    state: SequenceState,
    run_list: RunList,
    saved_configuration: Option<RunnerConfiguration>,
    active_row: Option<ActiveRow>,
    logger: Option<Arc<RunLogger>>,
}

impl Sequencer {
    /// Create a sequencer over the given run list, starting in Idle.
    pub fn new(run_list: RunList) -> Self {
        let active_row = (!run_list.is_empty()).then(|| ActiveRow {
            index: run_list.current_index(),
            running: false,
        });
        Self {
            state: SequenceState::Idle,
            run_list,
            saved_configuration: None,
            active_row,
            logger: None,
        }
    }

    /// Attach a per-run logger.
    pub fn with_logger(mut self, logger: Arc<RunLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Current state of the sequence.
    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Whether a measurement is in flight.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// The run list this sequencer drives.
    pub fn run_list(&self) -> &RunList {
        &self.run_list
    }

    /// Mutable access for user edits between events.
    ///
    /// While a measurement is in flight the display may reflect edits, but
    /// the cursor stays under the sequencer's authority: the active-row
    /// marker is only moved by transition effects.
    pub fn run_list_mut(&mut self) -> &mut RunList {
        &mut self.run_list
    }

    /// The highlighted table row, if any.
    pub fn active_row(&self) -> Option<ActiveRow> {
        self.active_row
    }

    /// The configuration snapshot taken when the sequence left Idle.
    pub fn saved_configuration(&self) -> Option<&RunnerConfiguration> {
        self.saved_configuration.as_ref()
    }

    /// Replace the run list wholesale (cache load path) and re-mark the
    /// active row from the new cursor.
    pub fn replace_run_list(&mut self, run_list: RunList) {
        self.run_list = run_list;
        self.active_row = (!self.run_list.is_empty()).then(|| ActiveRow {
            index: self.run_list.current_index(),
            running: self.state == SequenceState::Active,
        });
    }

    /// Process one event. Returns whether a transition fired; an event no
    /// guard admits is dropped with the state unchanged.
    pub fn process_event(&mut self, event: SequenceEvent, runner: &mut dyn ScanRunner) -> bool {
        let guards = self.guard_inputs(&*runner);
        match next_transition(self.state, event, &guards) {
            Some((next, effects)) => {
                tracing::debug!(
                    "{} --{:?}--> {}",
                    self.state.as_str(),
                    event,
                    next.as_str()
                );
                for effect in effects {
                    self.apply_effect(effect, runner);
                }
                if next != self.state {
                    if let Some(logger) = &self.logger {
                        logger.info(next.as_str());
                    }
                }
                self.state = next;
                true
            }
            None => {
                tracing::trace!("Dropped {:?} in state {}", event, self.state.as_str());
                false
            }
        }
    }

    /// React to the runner's state notification. A transition to idle
    /// means the measurement finished; the follow-up check decides whether
    /// to start the next entry.
    pub fn on_runner_state_changed(&mut self, idle: bool, runner: &mut dyn ScanRunner) {
        if idle {
            self.process_event(SequenceEvent::MeasurementFinished, runner);
            self.process_event(SequenceEvent::DoCheck, runner);
        }
    }

    /// Load the single selected entry's configuration into the runner
    /// without starting it. Silently skipped unless exactly one row is
    /// selected.
    pub fn load_line(&self, selected: &[usize], runner: &mut dyn ScanRunner) -> bool {
        let rows = unique_rows(selected.iter().copied());
        if rows.len() != 1 {
            return false;
        }
        match self.run_list.entry(rows[0]) {
            Some(entry) => {
                load_entry(entry, runner);
                true
            }
            None => false,
        }
    }

    fn guard_inputs(&self, runner: &dyn ScanRunner) -> GuardInputs {
        GuardInputs {
            runner_idle: runner.current_idle_status(),
            next_eligible: self.run_list.find_next_eligible(),
            stop_flag: self
                .run_list
                .current_entry()
                .map(|entry| entry.stop_flag)
                .unwrap_or(false),
            at_list_start: self.run_list.current_index() == 0,
            repeat: self.run_list.repeat(),
        }
    }

    fn apply_effect(&mut self, effect: Effect, runner: &mut dyn ScanRunner) {
        match effect {
            Effect::SaveConfiguration => {
                self.saved_configuration = Some(runner.current_configuration());
            }
            Effect::RestoreConfiguration => {
                if let Some(saved) = self.saved_configuration.clone() {
                    let entry = RunEntry {
                        scan: saved.scan,
                        measurement: saved.measurement,
                        evaluation: saved.evaluation,
                        analysis: saved.analysis,
                        ..RunEntry::default()
                    };
                    load_entry(&entry, runner);
                }
            }
            Effect::MoveCursorTo(index) => {
                self.run_list.set_current_index(index);
            }
            Effect::AdvanceCursor => {
                self.run_list.advance_cursor();
                self.active_row = (!self.run_list.is_empty()).then(|| ActiveRow {
                    index: self.run_list.current_index(),
                    running: false,
                });
                if let Some(logger) = &self.logger {
                    if !self.run_list.is_empty() {
                        let percent =
                            (self.run_list.current_index() * 100 / self.run_list.len()) as u32;
                        logger.progress(percent);
                    }
                }
            }
            Effect::StartEntry => {
                let Some(entry) = self.run_list.current_entry().cloned() else {
                    return;
                };
                load_entry(&entry, runner);
                runner.start(entry.settings.pairs());
                self.active_row = Some(ActiveRow {
                    index: self.run_list.current_index(),
                    running: true,
                });
                if let Some(logger) = &self.logger {
                    logger.phase(&entry.display_label());
                }
            }
        }
    }
}

/// Load an entry's selections into the runner, switching the active scan
/// context only when it differs from the current one.
fn load_entry(entry: &RunEntry, runner: &mut dyn ScanRunner) {
    if let Some(scan) = &entry.scan {
        if runner.current_configuration().scan.as_deref() != Some(scan.as_str()) {
            runner.select_scan(scan);
        }
    }
    if let Some(measurement) = &entry.measurement {
        runner.load_measurement_setting(measurement);
    }
    if let Some(evaluation) = &entry.evaluation {
        runner.load_evaluation_setting(evaluation);
    }
    runner.load_analysis_configuration(entry.analysis.as_deref().unwrap_or(""));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockRunner {
        idle: bool,
        configuration: RunnerConfiguration,
        selected_scans: Vec<String>,
        loaded_measurements: Vec<String>,
        loaded_evaluations: Vec<String>,
        loaded_analyses: Vec<String>,
        started: Vec<Vec<(String, f64)>>,
    }

    impl MockRunner {
        fn idle() -> Self {
            Self {
                idle: true,
                configuration: RunnerConfiguration {
                    scan: Some("cavity".to_string()),
                    measurement: Some("baseline".to_string()),
                    evaluation: Some("raw".to_string()),
                    analysis: None,
                },
                ..Self::default()
            }
        }
    }

    impl ScanRunner for MockRunner {
        fn current_idle_status(&self) -> bool {
            self.idle
        }

        fn current_configuration(&self) -> RunnerConfiguration {
            self.configuration.clone()
        }

        fn select_scan(&mut self, name: &str) {
            self.selected_scans.push(name.to_string());
            self.configuration.scan = Some(name.to_string());
        }

        fn load_measurement_setting(&mut self, name: &str) {
            self.loaded_measurements.push(name.to_string());
            self.configuration.measurement = Some(name.to_string());
        }

        fn load_evaluation_setting(&mut self, name: &str) {
            self.loaded_evaluations.push(name.to_string());
            self.configuration.evaluation = Some(name.to_string());
        }

        fn load_analysis_configuration(&mut self, name: &str) {
            self.loaded_analyses.push(name.to_string());
            self.configuration.analysis = (!name.is_empty()).then(|| name.to_string());
        }

        fn start(&mut self, settings: &[(String, f64)]) {
            self.started.push(settings.to_vec());
        }
    }

    fn entry(name: &str, enabled: bool) -> RunEntry {
        let mut e = RunEntry::new("ions", name, "mean", "fit");
        e.enabled = enabled;
        e
    }

    fn sequencer(entries: Vec<RunEntry>) -> Sequencer {
        let mut list = RunList::new();
        for e in entries {
            list.add_entry(e);
        }
        Sequencer::new(list)
    }

    #[test]
    fn start_refused_when_runner_busy() {
        let mut seq = sequencer(vec![entry("a", true)]);
        let mut runner = MockRunner::idle();
        runner.idle = false;

        assert!(!seq.process_event(SequenceEvent::Start, &mut runner));
        assert_eq!(seq.state(), SequenceState::Idle);
        assert!(runner.started.is_empty());
    }

    #[test]
    fn start_refused_with_nothing_enabled() {
        let mut seq = sequencer(vec![entry("a", false)]);
        let mut runner = MockRunner::idle();

        assert!(!seq.process_event(SequenceEvent::Start, &mut runner));
        assert_eq!(seq.state(), SequenceState::Idle);
        assert_eq!(seq.run_list().current_index(), 0);
    }

    #[test]
    fn start_skips_to_first_enabled_entry() {
        let mut seq = sequencer(vec![entry("a", false), entry("b", true), entry("c", true)]);
        let mut runner = MockRunner::idle();

        assert!(seq.process_event(SequenceEvent::Start, &mut runner));
        assert_eq!(seq.state(), SequenceState::Active);
        assert_eq!(seq.run_list().current_index(), 1);
        assert_eq!(runner.loaded_measurements, vec!["b"]);
        assert_eq!(runner.started.len(), 1);
        assert_eq!(
            seq.active_row(),
            Some(ActiveRow {
                index: 1,
                running: true
            })
        );
    }

    #[test]
    fn start_saves_configuration_and_switches_scan() {
        let mut seq = sequencer(vec![entry("a", true)]);
        let mut runner = MockRunner::idle();

        seq.process_event(SequenceEvent::Start, &mut runner);

        let saved = seq.saved_configuration().unwrap();
        assert_eq!(saved.scan.as_deref(), Some("cavity"));
        assert_eq!(saved.measurement.as_deref(), Some("baseline"));
        // Entry scan "ions" differs from the runner's "cavity".
        assert_eq!(runner.selected_scans, vec!["ions"]);
    }

    #[test]
    fn scan_context_not_switched_when_already_current() {
        let mut seq = sequencer(vec![entry("a", true)]);
        let mut runner = MockRunner::idle();
        runner.configuration.scan = Some("ions".to_string());

        seq.process_event(SequenceEvent::Start, &mut runner);
        assert!(runner.selected_scans.is_empty());
    }

    #[test]
    fn stop_flag_halts_sequence_and_restores() {
        let mut seq = sequencer(vec![entry("a", true), entry("b", true)]);
        seq.run_list_mut().toggle_stop_flag(&[0]);
        let mut runner = MockRunner::idle();

        seq.process_event(SequenceEvent::Start, &mut runner);
        seq.on_runner_state_changed(true, &mut runner);

        assert_eq!(seq.state(), SequenceState::Idle);
        // Cursor advanced past the aborted entry.
        assert_eq!(seq.run_list().current_index(), 1);
        assert_eq!(runner.started.len(), 1);
        // Restore switched back to the saved scan and reloaded its settings.
        assert_eq!(runner.selected_scans, vec!["ions", "cavity"]);
        assert_eq!(runner.loaded_measurements.last().unwrap(), "baseline");
        assert_eq!(runner.loaded_evaluations.last().unwrap(), "raw");
        assert_eq!(runner.loaded_analyses.last().unwrap(), "");
    }

    #[test]
    fn full_cycle_without_repeat_stops_at_wrap() {
        let mut seq = sequencer(vec![entry("a", true), entry("b", true), entry("c", true)]);
        let mut runner = MockRunner::idle();

        seq.process_event(SequenceEvent::Start, &mut runner);
        seq.on_runner_state_changed(true, &mut runner);
        assert_eq!(seq.state(), SequenceState::Active);
        seq.on_runner_state_changed(true, &mut runner);
        assert_eq!(seq.state(), SequenceState::Active);
        // Third completion wraps the cursor to 0; repeat is off, so the
        // sequence settles into Idle.
        seq.on_runner_state_changed(true, &mut runner);

        assert_eq!(seq.state(), SequenceState::Idle);
        assert_eq!(seq.run_list().current_index(), 0);
        assert_eq!(runner.started.len(), 3);
        assert_eq!(runner.loaded_measurements[..3], ["a", "b", "c"]);
    }

    #[test]
    fn repeat_wraps_and_restarts() {
        let mut seq = sequencer(vec![entry("a", true), entry("b", true)]);
        seq.run_list_mut().set_repeat(true);
        let mut runner = MockRunner::idle();

        seq.process_event(SequenceEvent::Start, &mut runner);
        seq.on_runner_state_changed(true, &mut runner);
        seq.on_runner_state_changed(true, &mut runner);

        // Wrapped back to entry a and kept running.
        assert_eq!(seq.state(), SequenceState::Active);
        assert_eq!(seq.run_list().current_index(), 0);
        assert_eq!(runner.started.len(), 3);
    }

    #[test]
    fn stop_during_active_waits_then_idles() {
        let mut seq = sequencer(vec![entry("a", true), entry("b", true)]);
        let mut runner = MockRunner::idle();

        seq.process_event(SequenceEvent::Start, &mut runner);
        seq.process_event(SequenceEvent::Stop, &mut runner);
        assert_eq!(seq.state(), SequenceState::WaitingForCompletion);
        assert_eq!(runner.started.len(), 1);

        seq.on_runner_state_changed(true, &mut runner);
        assert_eq!(seq.state(), SequenceState::Idle);
        // Cursor points at the next candidate even though the run was cut.
        assert_eq!(seq.run_list().current_index(), 1);
        assert_eq!(runner.started.len(), 1);
    }

    #[test]
    fn start_passes_entry_settings() {
        let mut e = entry("a", true);
        e.settings.set("gate_time", 0.25);
        e.settings.set("amplitude", 2.0);
        let mut seq = sequencer(vec![e]);
        let mut runner = MockRunner::idle();

        seq.process_event(SequenceEvent::Start, &mut runner);
        assert_eq!(
            runner.started[0],
            vec![
                ("gate_time".to_string(), 0.25),
                ("amplitude".to_string(), 2.0)
            ]
        );
    }

    #[test]
    fn emptied_list_mid_run_stays_recoverable() {
        let mut seq = sequencer(vec![entry("a", true)]);
        let mut runner = MockRunner::idle();

        seq.process_event(SequenceEvent::Start, &mut runner);
        seq.run_list_mut().remove_entries(&[0]);

        // Finished event finds nothing to do; it is dropped.
        seq.on_runner_state_changed(true, &mut runner);
        assert_eq!(seq.state(), SequenceState::Active);

        // Stop still brings the machine home.
        seq.process_event(SequenceEvent::Stop, &mut runner);
        seq.on_runner_state_changed(true, &mut runner);
        assert_eq!(seq.state(), SequenceState::Idle);
    }

    #[test]
    fn load_line_requires_single_selection() {
        let seq = sequencer(vec![entry("a", true), entry("b", true)]);
        let mut runner = MockRunner::idle();

        assert!(!seq.load_line(&[0, 1], &mut runner));
        assert!(!seq.load_line(&[], &mut runner));
        assert!(!seq.load_line(&[7], &mut runner));
        assert!(runner.loaded_measurements.is_empty());

        // Duplicate cell indices of one row still count as one selection.
        assert!(seq.load_line(&[1, 1], &mut runner));
        assert_eq!(runner.loaded_measurements, vec!["b"]);
    }

    #[test]
    fn replace_run_list_remarks_active_row() {
        let mut seq = sequencer(vec![entry("a", true)]);
        let mut list = RunList::new();
        list.add_entry(entry("x", true));
        list.add_entry(entry("y", true));
        list.set_current_index(1);

        seq.replace_run_list(list);
        assert_eq!(
            seq.active_row(),
            Some(ActiveRow {
                index: 1,
                running: false
            })
        );
    }
}
