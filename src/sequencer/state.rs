//! States, events, guards, and the pure transition function.
//!
//! Transitions are computed without touching the run list or the runner:
//! `next_transition` maps (state, event, guard inputs) to the new state and
//! an ordered list of effects, and the `Sequencer` executes the effects.
//! An event with no matching transition is dropped and the state is
//! unchanged; that is the normal "try again later" path, not a fault.

/// State of the run sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// Nothing running; the saved instrument configuration is in place.
    Idle,
    /// An entry has been loaded into the runner and started.
    Active,
    /// Stop was requested; the current measurement is allowed to finish.
    WaitingForCompletion,
    /// A measurement finished; deciding whether to start the next entry.
    Check,
    /// Sequence suspended by the user.
    Paused,
}

impl SequenceState {
    /// Display string for the status label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Active => "Measurement Running",
            Self::WaitingForCompletion => "Waiting for Completion",
            Self::Check => "Check",
            Self::Paused => "Paused",
        }
    }

    /// Whether a measurement is in flight (Active or WaitingForCompletion).
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Active | Self::WaitingForCompletion)
    }
}

/// Events the sequencer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    /// User pressed run.
    Start,
    /// User pressed stop.
    Stop,
    /// The runner reported the current measurement finished.
    MeasurementFinished,
    /// Follow-up after a finished measurement: start the next entry or
    /// settle into Idle.
    DoCheck,
}

/// Guard inputs sampled once per event, before any effect runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardInputs {
    /// The runner reports idle/ready.
    pub runner_idle: bool,
    /// Position of the next enabled entry from the cursor
    /// (forward scan, wrapping only when repeat is set).
    pub next_eligible: Option<usize>,
    /// Stop flag of the entry under the cursor.
    pub stop_flag: bool,
    /// The cursor sits at index 0.
    pub at_list_start: bool,
    /// The repeat flag of the run list.
    pub repeat: bool,
}

/// Side effects a transition orders, executed in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Snapshot the runner's current configuration (leaving Idle).
    SaveConfiguration,
    /// Restore the snapshot taken when the sequence started (entering Idle).
    RestoreConfiguration,
    /// Place the cursor on the given entry.
    MoveCursorTo(usize),
    /// Step the cursor forward by one, wrapping at the end of the list,
    /// and reposition the (non-running) active-row marker.
    AdvanceCursor,
    /// Load the entry under the cursor into the runner, start it, and mark
    /// its row as the running row.
    StartEntry,
}

/// Compute the transition for an event, if any guard admits one.
///
/// The cursor always advances when a measurement leaves the running pair of
/// states, whichever event caused it, so it points at the next candidate
/// even after an aborted run. Guards read the pre-advance cursor.
pub fn next_transition(
    state: SequenceState,
    event: SequenceEvent,
    guards: &GuardInputs,
) -> Option<(SequenceState, Vec<Effect>)> {
    use Effect::*;
    use SequenceEvent::*;
    use SequenceState::*;

    match (state, event) {
        (Idle, Start) => match guards.next_eligible {
            Some(index) if guards.runner_idle => Some((
                Active,
                vec![SaveConfiguration, MoveCursorTo(index), StartEntry],
            )),
            _ => None,
        },
        (Idle, Stop) | (Paused, Stop) => Some((Idle, vec![])),
        (Active, Stop) => Some((WaitingForCompletion, vec![])),
        (Active, MeasurementFinished) => {
            if guards.stop_flag {
                Some((Idle, vec![AdvanceCursor, RestoreConfiguration]))
            } else if guards.runner_idle && guards.next_eligible.is_some() {
                Some((Check, vec![AdvanceCursor]))
            } else {
                None
            }
        }
        (WaitingForCompletion, MeasurementFinished) => {
            Some((Idle, vec![AdvanceCursor, RestoreConfiguration]))
        }
        (Check, DoCheck) => match guards.next_eligible {
            Some(index) if !guards.at_list_start || guards.repeat => {
                Some((Active, vec![MoveCursorTo(index), StartEntry]))
            }
            _ => Some((Idle, vec![RestoreConfiguration])),
        },
        _ => None,
    }
}
