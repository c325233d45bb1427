//! Aggregated spreadsheet model over named traces.

use std::sync::Arc;

use super::collection::{PlottedTrace, SharedTraceCollection};

/// Which axis a column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Header suffix for this axis.
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// One table column: which trace it comes from and which array it shows.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Trace name, shown in the header.
    pub label: String,
    /// Axis of the backing array.
    pub axis: Axis,
    /// Column key within the trace's collection.
    pub column_key: String,
    /// Index of the owning trace.
    pub trace: usize,
}

/// Spreadsheet view over one or more traces sharing a common x-array.
///
/// Columns are built once at construction: an x column is added whenever a
/// trace's x-array differs from the previously added one, and a y column is
/// added for every trace, so the column count depends on how many distinct
/// x-arrays the traces carry. Structural edits are applied to every
/// non-empty array of every referenced collection, which keeps all column
/// lengths identical; reads go through the shared collections on every
/// access, so there is no separate rebinding step after a resize.
pub struct TraceTable {
    traces: Vec<PlottedTrace>,
    columns: Vec<ColumnDescriptor>,
}

impl TraceTable {
    /// Build the table over the given traces, in order.
    pub fn new(traces: Vec<PlottedTrace>) -> Self {
        let mut columns = Vec::new();
        let mut previous_x: Option<Vec<f64>> = None;
        for (index, trace) in traces.iter().enumerate() {
            let x = trace.x_values();
            if previous_x.as_ref() != Some(&x) {
                columns.push(ColumnDescriptor {
                    label: trace.name.clone(),
                    axis: Axis::X,
                    column_key: trace.x_column.clone(),
                    trace: index,
                });
            }
            columns.push(ColumnDescriptor {
                label: trace.name.clone(),
                axis: Axis::Y,
                column_key: trace.y_column.clone(),
                trace: index,
            });
            previous_x = Some(x);
        }
        Self { traces, columns }
    }

    /// The column descriptors in display order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows, read from the first column's backing array.
    pub fn row_count(&self) -> usize {
        match self.columns.first() {
            Some(descriptor) => {
                let trace = &self.traces[descriptor.trace];
                trace
                    .collection
                    .lock()
                    .get(&descriptor.column_key)
                    .map(Vec::len)
                    .unwrap_or(0)
            }
            None => 0,
        }
    }

    /// Column header, e.g. `signal.x`.
    pub fn header(&self, column: usize) -> Option<String> {
        self.columns
            .get(column)
            .map(|descriptor| format!("{}.{}", descriptor.label, descriptor.axis.as_str()))
    }

    /// Read one cell.
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        let descriptor = self.columns.get(column)?;
        let trace = &self.traces[descriptor.trace];
        let collection = trace.collection.lock();
        collection
            .get(&descriptor.column_key)
            .and_then(|values| values.get(row).copied())
    }

    /// Write one cell. Rejected when the cell is out of range.
    pub fn set_value(&mut self, row: usize, column: usize, value: f64) -> bool {
        let Some(descriptor) = self.columns.get(column) else {
            return false;
        };
        let trace = &self.traces[descriptor.trace];
        let mut collection = trace.collection.lock();
        match collection
            .get_mut(&descriptor.column_key)
            .and_then(|values| values.get_mut(row))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Snapshot of one column's values.
    pub fn column_values(&self, column: usize) -> Option<Vec<f64>> {
        let descriptor = self.columns.get(column)?;
        let trace = &self.traces[descriptor.trace];
        trace.collection.lock().get(&descriptor.column_key).cloned()
    }

    /// Insert a zero row after `position` in every backing array.
    /// Rejected when `position` is out of range.
    pub fn insert_row(&mut self, position: usize) -> bool {
        if position >= self.row_count() {
            return false;
        }
        for collection in self.collections() {
            collection
                .lock()
                .for_each_array_mut(|values| values.insert(position + 1, 0.0));
        }
        true
    }

    /// Delete the rows `[position, position + count)` from every backing
    /// array. Rejected when the range is out of bounds.
    pub fn remove_rows(&mut self, position: usize, count: usize) -> bool {
        if count == 0 || position + count > self.row_count() {
            return false;
        }
        for collection in self.collections() {
            collection.lock().for_each_array_mut(|values| {
                values.drain(position..position + count);
            });
        }
        true
    }

    /// Insert copies of the selected rows, in the order given, after
    /// `position` in every backing array.
    pub fn copy_rows(&mut self, rows: &[usize], position: usize) -> bool {
        let row_count = self.row_count();
        if position >= row_count || rows.iter().any(|&row| row >= row_count) {
            return false;
        }
        for collection in self.collections() {
            collection.lock().for_each_array_mut(|values| {
                let copies: Vec<f64> = rows.iter().map(|&row| values[row]).collect();
                values.splice(position + 1..position + 1, copies);
            });
        }
        true
    }

    /// Zero each targeted `(row, column)` cell in place. Rejected without
    /// touching anything when any cell is out of range.
    pub fn clear_cells(&mut self, cells: &[(usize, usize)]) -> bool {
        let row_count = self.row_count();
        if cells
            .iter()
            .any(|&(row, column)| row >= row_count || column >= self.columns.len())
        {
            return false;
        }
        for &(row, column) in cells {
            self.set_value(row, column, 0.0);
        }
        true
    }

    /// Swap each selected row with the row `delta` positions away, across
    /// every backing array. Rejected when any resulting index would leave
    /// the table. Returns whether the move was applied.
    pub fn move_rows(&mut self, rows: &[usize], delta: isize) -> bool {
        if rows.is_empty() {
            return false;
        }
        let row_count = self.row_count() as isize;
        let mut sorted = rows.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for &row in &sorted {
            let target = row as isize + delta;
            if row as isize >= row_count || target < 0 || target >= row_count {
                return false;
            }
        }
        // Walk toward the move direction so multi-row selections shift as
        // a block instead of leapfrogging each other.
        if delta > 0 {
            sorted.reverse();
        }
        for collection in self.collections() {
            collection.lock().for_each_array_mut(|values| {
                for &row in &sorted {
                    let target = (row as isize + delta) as usize;
                    values.swap(row, target);
                }
            });
        }
        true
    }

    /// The distinct collections referenced by this table's traces.
    fn collections(&self) -> Vec<SharedTraceCollection> {
        let mut distinct: Vec<SharedTraceCollection> = Vec::new();
        for trace in &self.traces {
            if !distinct
                .iter()
                .any(|known| Arc::ptr_eq(known, &trace.collection))
            {
                distinct.push(Arc::clone(&trace.collection));
            }
        }
        distinct
    }
}
