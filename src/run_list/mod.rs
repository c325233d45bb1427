//! Run-list model: the ordered to-do list of measurement jobs.
//!
//! This module provides:
//! - `RunEntry`: one queued (scan, measurement, evaluation, analysis) job
//! - `SettingsMap`: ordered per-entry settings passed to the runner
//! - `RunList`: the ordered sequence with cursor, repeat flag, and the
//!   reorder/copy/remove operations the editor exposes
//!
//! The sequencer owns the `RunList` and is the only writer during a run;
//! user edits funnel through the same owner between events.

mod list;
mod types;

pub use list::RunList;
pub use types::{MoveDirection, RunEntry, SettingsMap};
