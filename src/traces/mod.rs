//! Trace data aggregation for the spreadsheet editor.
//!
//! This module provides:
//! - `TraceCollection`: keyed numeric arrays owned by the acquisition side
//!   and shared with the table through `SharedTraceCollection`
//! - `PlottedTrace`: one named (x, y) pair of columns within a collection
//! - `TraceTable`: the aggregate spreadsheet model with synchronized row
//!   editing across every column
//!
//! The table is the column-synchronization authority: every structural
//! edit (insert/remove/copy/move) runs over all arrays of all referenced
//! collections so the columns never drift apart in length.

mod collection;
mod table;

pub use collection::{shared, PlottedTrace, SharedTraceCollection, TraceCollection};
pub use table::{Axis, ColumnDescriptor, TraceTable};
