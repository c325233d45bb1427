//! Row-selection helpers and the clipboard row-list text format.
//!
//! Copy places the selected row indices on the clipboard as text like
//! `"[0, 2, 1]"`; paste parses that text back and appends copies of those
//! rows. Malformed clipboard text is the one failure in this crate that is
//! surfaced to the user rather than swallowed.

use thiserror::Error;

use crate::run_list::MoveDirection;

/// Error raised when pasted clipboard text cannot be parsed as a row list.
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Invalid data on clipboard. Cannot paste into the run list: {text:?}")]
    Malformed { text: String },
}

/// Collapse selected cell indices to sorted, de-duplicated row numbers.
///
/// Table selections report one index per cell, so a selected row appears
/// once per column.
pub fn unique_rows(indices: impl IntoIterator<Item = usize>) -> Vec<usize> {
    let mut rows: Vec<usize> = indices.into_iter().collect();
    rows.sort_unstable();
    rows.dedup();
    rows
}

/// Format rows for the clipboard, e.g. `[0, 2, 1]`.
pub fn format_row_list(rows: &[usize]) -> String {
    let inner: Vec<String> = rows.iter().map(|row| row.to_string()).collect();
    format!("[{}]", inner.join(", "))
}

/// Selection after a successful one-step move: every row shifted by the
/// move delta, so the selection follows the moved rows.
pub fn shifted_rows(rows: &[usize], direction: MoveDirection) -> Vec<usize> {
    rows.iter()
        .map(|&row| (row as isize + direction.delta()) as usize)
        .collect()
}

/// Parse clipboard text like `"[0, 2, 1]"` back into row indices,
/// preserving the literal order.
pub fn parse_row_list(text: &str) -> Result<Vec<usize>, ClipboardError> {
    let malformed = || ClipboardError::Malformed {
        text: text.to_string(),
    };
    let inner = text
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');
    inner
        .split(',')
        .map(|part| part.trim().parse::<usize>().map_err(|_| malformed()))
        .collect()
}
