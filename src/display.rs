//! Display helpers
//!
//! Presentation-side rendering of a reconciled result. Temporal cells are
//! converted for display and their pre-conversion values kept in an explicit
//! `OriginalValues` map owned by the grid, so "show original value" and
//! "change time format" never need to re-query the database.

use std::collections::{BTreeMap, HashMap};

use crate::timestamp::{convert, FormatTag, TemporalMatcher};
use crate::value::Value;
use crate::wal::ReconciledResult;

/// Identifies a displayed row (its index in the grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHandle(pub usize);

/// Pre-conversion values of temporal cells, by row then column index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginalValues {
    inner: HashMap<RowHandle, BTreeMap<usize, Value>>,
}

impl OriginalValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: RowHandle, column: usize, value: Value) {
        self.inner.entry(row).or_default().insert(column, value);
    }

    /// The stored value behind a converted cell
    pub fn get(&self, row: RowHandle, column: usize) -> Option<&Value> {
        self.inner.get(&row).and_then(|cols| cols.get(&column))
    }

    /// All converted cells of one row
    pub fn row(&self, row: RowHandle) -> Option<&BTreeMap<usize, Value>> {
        self.inner.get(&row)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Plain text form of a cell
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// A fully rendered table
#[derive(Debug, Clone)]
pub struct DisplayGrid {
    pub columns: Vec<String>,

    /// Per column: is it treated as temporal
    pub temporal: Vec<bool>,

    /// Per column: format used for temporal cells
    pub formats: Vec<FormatTag>,

    /// Rendered cells, row-major
    pub cells: Vec<Vec<String>>,

    /// Per row: recovered from the WAL
    pub wal_rows: Vec<bool>,

    pub originals: OriginalValues,
}

impl DisplayGrid {
    /// Render every cell of `result`
    ///
    /// `overrides` maps column names to a format; other temporal columns use
    /// `default_format`. Null temporal cells are left empty and not cached.
    pub fn build(
        result: &ReconciledResult,
        matcher: &dyn TemporalMatcher,
        overrides: &HashMap<String, FormatTag>,
        default_format: FormatTag,
    ) -> Self {
        let temporal: Vec<bool> = result.columns.iter().map(|c| matcher.is_temporal(c)).collect();
        let formats: Vec<FormatTag> = result
            .columns
            .iter()
            .map(|c| overrides.get(c).copied().unwrap_or(default_format))
            .collect();

        let mut originals = OriginalValues::new();
        let mut cells = Vec::with_capacity(result.rows.len());
        let mut wal_rows = Vec::with_capacity(result.rows.len());

        for (index, row) in result.rows.iter().enumerate() {
            let handle = RowHandle(index);
            let rendered: Vec<String> = row
                .values()
                .iter()
                .enumerate()
                .map(|(col, value)| {
                    if temporal.get(col).copied().unwrap_or(false) && !value.is_null() {
                        originals.insert(handle, col, value.clone());
                        convert(value, formats[col])
                    } else {
                        render_value(value)
                    }
                })
                .collect();

            cells.push(rendered);
            wal_rows.push(result.is_wal_only(index));
        }

        Self {
            columns: result.columns.clone(),
            temporal,
            formats,
            cells,
            wal_rows,
            originals,
        }
    }

    /// Re-render one temporal column under a new format
    ///
    /// Returns false if the column is unknown or not temporal.
    pub fn reformat(&mut self, column: &str, format: FormatTag) -> bool {
        let Some(col) = self.columns.iter().position(|c| c == column) else {
            return false;
        };
        if !self.temporal[col] {
            return false;
        }

        self.formats[col] = format;
        for (index, row) in self.cells.iter_mut().enumerate() {
            if let Some(original) = self.originals.get(RowHandle(index), col) {
                row[col] = convert(original, format);
            }
        }
        true
    }

    /// Pre-conversion value of a displayed cell
    pub fn original_value(&self, row: RowHandle, column: usize) -> Option<&Value> {
        self.originals.get(row, column)
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }
}
