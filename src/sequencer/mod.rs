//! Run-sequence state machine.
//!
//! The sequencer walks the run list and hands one entry at a time to the
//! external scan runner:
//!
//! ```text
//!            startCommand                measurementFinished
//!   Idle ───────────────────▶ Active ──────────────────────▶ Check
//!    ▲                          │                              │
//!    │        stopCommand       ▼        measurementFinished   │ docheck
//!    ├──────────────── WaitingForCompletion ───────────────────┤
//!    │                                                         │
//!    └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Transitions are pure functions of (state, event, guard inputs) returning
//! the new state plus an ordered effect list; the `Sequencer` object owns
//! the run list, samples the guards, and executes the effects against the
//! runner. Leaving Idle snapshots the runner's configuration; entering Idle
//! restores it, so a finished or aborted sequence hands the instrument back
//! the way it found it.

mod sequencer;
mod state;

pub use sequencer::{ActiveRow, Sequencer};
pub use state::{next_transition, Effect, GuardInputs, SequenceEvent, SequenceState};
