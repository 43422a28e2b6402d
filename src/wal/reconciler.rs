//! WAL reconciler
//!
//! Merges main-file rows with rows recovered from the `-wal` sibling.
//!
//! ## Merge Rules
//! - Main rows come first, in storage-natural order, bounded by `row_limit`
//! - With a primary key: a WAL row is appended only if its key is absent
//!   from the main table (all of it, not just the limited fetch) and was not
//!   already appended; the main row always wins a collision
//! - Without a primary key: every WAL row is appended and flagged by index
//! - WAL-only rows are never truncated by `row_limit`
//!
//! For a source that replays frames onto a copy of the main file (overlay),
//! "WAL rows" are the whole post-replay table. Keyed tables need nothing
//! extra. For keyless tables the main rows are first removed from it as a
//! multiset of full-row values, so only rows the WAL added are appended.
//! - Any failure while reading the WAL degrades to "no WAL contribution"

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::WalStrategy;
use crate::error::Result;
use crate::storage::catalog::key_names;
use crate::storage::{ColumnSchemaReader, Database};
use crate::value::{PrimaryKey, Row};

use super::source::{open_wal_source, WalSource};

/// Which rows are WAL-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WalOnlyKeys {
    /// Primary-key tuples of appended WAL rows
    Keys(HashSet<PrimaryKey>),

    /// Row indices of appended WAL rows (table has no primary key)
    Indices(BTreeSet<usize>),
}

impl WalOnlyKeys {
    pub fn len(&self) -> usize {
        match self {
            WalOnlyKeys::Keys(k) => k.len(),
            WalOnlyKeys::Indices(i) => i.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What happened to the WAL side of a read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WalStatus {
    /// WAL merge was not requested
    Skipped,

    /// No `-wal` sibling next to the database
    Absent,

    /// Sibling read through `source`, yielding `rows_read` rows before dedup
    Merged { source: String, rows_read: usize },

    /// Sibling present but unusable; result holds main rows only
    Unreadable(String),
}

/// Provenance of one result row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowOrigin {
    Main,
    Wal,
}

/// Unified row set with provenance
///
/// Rows `[0, main_row_count)` came from the main file; every later row came
/// from the WAL and was absent from the main file when the merge ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub wal_only: WalOnlyKeys,
    pub main_row_count: usize,
    pub wal_status: WalStatus,
}

impl ReconciledResult {
    /// A result holding main rows only
    pub fn main_only(columns: Vec<String>, rows: Vec<Row>, keyed: bool, status: WalStatus) -> Self {
        let wal_only = if keyed {
            WalOnlyKeys::Keys(HashSet::new())
        } else {
            WalOnlyKeys::Indices(BTreeSet::new())
        };

        Self {
            columns,
            main_row_count: rows.len(),
            rows,
            wal_only,
            wal_status: status,
        }
    }

    /// Where the row at `index` came from
    pub fn origin(&self, index: usize) -> Option<RowOrigin> {
        if index >= self.rows.len() {
            None
        } else if index < self.main_row_count {
            Some(RowOrigin::Main)
        } else {
            Some(RowOrigin::Wal)
        }
    }

    pub fn is_wal_only(&self, index: usize) -> bool {
        self.origin(index) == Some(RowOrigin::Wal)
    }

    /// Rows recovered from the WAL
    pub fn wal_rows(&self) -> &[Row] {
        &self.rows[self.main_row_count.min(self.rows.len())..]
    }

    pub fn wal_only_count(&self) -> usize {
        self.rows.len().saturating_sub(self.main_row_count)
    }
}

/// Column layout resolved once per reconcile
struct MergePlan {
    table: String,
    key_columns: Vec<String>,
    key_positions: Vec<usize>,
    row_limit: Option<usize>,
}

/// Merges a table's main rows with its WAL-only rows
pub struct WalReconciler<'a> {
    db: &'a Database,
    strategy: WalStrategy,
}

impl<'a> WalReconciler<'a> {
    pub fn new(db: &'a Database, strategy: WalStrategy) -> Self {
        Self { db, strategy }
    }

    /// Reconcile `table` against the sibling found next to the database file
    ///
    /// Schema and main-file failures propagate. Nothing on the WAL side does.
    pub fn reconcile(&self, table: &str, row_limit: Option<usize>) -> Result<ReconciledResult> {
        let (plan, mut result) = self.read_main(table, row_limit)?;

        let source = match open_wal_source(self.db.path(), self.strategy) {
            Ok(Some(source)) => source,
            Ok(None) => {
                debug!(table, "no WAL sibling; main rows only");
                result.wal_status = WalStatus::Absent;
                return Ok(result);
            }
            Err(e) => {
                warn!(table, error = %e, "WAL sibling unusable; continuing without it");
                result.wal_status = WalStatus::Unreadable(e.to_string());
                return Ok(result);
            }
        };

        self.merge(&plan, source.as_ref(), result)
    }

    /// Reconcile `table` against an explicitly provided source
    pub fn reconcile_with(
        &self,
        table: &str,
        row_limit: Option<usize>,
        source: &dyn WalSource,
    ) -> Result<ReconciledResult> {
        let (plan, result) = self.read_main(table, row_limit)?;
        self.merge(&plan, source, result)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Steps 1-2: schema, key columns, limited main fetch
    fn read_main(&self, table: &str, row_limit: Option<usize>) -> Result<(MergePlan, ReconciledResult)> {
        let columns = ColumnSchemaReader::new(self.db).read(table)?;
        let key_columns = key_names(&columns);
        let key_positions: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_primary_key)
            .map(|(i, _)| i)
            .collect();
        let names: Vec<String> = columns.into_iter().map(|c| c.name).collect();

        let rows = self.db.fetch_rows(table, &names, row_limit)?;
        debug!(table, rows = rows.len(), keys = key_columns.len(), "read main rows");

        let keyed = !key_columns.is_empty();
        let plan = MergePlan {
            table: table.to_string(),
            key_columns,
            key_positions,
            row_limit,
        };

        Ok((plan, ReconciledResult::main_only(names, rows, keyed, WalStatus::Skipped)))
    }

    /// Steps 4-7: fetch from the source and append WAL-only rows
    fn merge(&self, plan: &MergePlan, source: &dyn WalSource, mut result: ReconciledResult) -> Result<ReconciledResult> {
        let wal_rows = match source.fetch_rows(&plan.table, &result.columns) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(table = %plan.table, source = source.label(), error = %e, "WAL read failed; continuing without it");
                result.wal_status = WalStatus::Unreadable(e.to_string());
                return Ok(result);
            }
        };
        let rows_read = wal_rows.len();

        if plan.key_columns.is_empty() {
            let wal_rows = if source.includes_main() {
                self.subtract_main_rows(plan, &result, wal_rows)?
            } else {
                wal_rows
            };
            let start = result.rows.len();
            result.rows.extend(wal_rows);
            result.wal_only = WalOnlyKeys::Indices((start..result.rows.len()).collect());
        } else {
            let main_keys = self.main_keys(plan, &result.rows)?;
            let mut wal_only = HashSet::new();

            for row in wal_rows {
                let key = row.key_at(&plan.key_positions);
                if !main_keys.contains(&key) && wal_only.insert(key) {
                    result.rows.push(row);
                }
            }
            result.wal_only = WalOnlyKeys::Keys(wal_only);
        }

        result.wal_status = WalStatus::Merged {
            source: source.label().to_string(),
            rows_read,
        };

        info!(
            table = %plan.table,
            source = source.label(),
            main = result.main_row_count,
            wal_read = rows_read,
            wal_only = result.wal_only.len(),
            "reconciled WAL"
        );

        Ok(result)
    }

    /// Drop one post-replay row per identical main row
    ///
    /// Without a key, row identity is the full tuple of values. Every main
    /// row counts, including those hidden by `row_limit`.
    fn subtract_main_rows(&self, plan: &MergePlan, result: &ReconciledResult, replayed: Vec<Row>) -> Result<Vec<Row>> {
        let hidden;
        let main_rows: &[Row] = match plan.row_limit {
            None => &result.rows[..result.main_row_count],
            Some(_) => {
                hidden = self.db.fetch_rows(&plan.table, &result.columns, None)?;
                &hidden
            }
        };

        let mut remaining: HashMap<&Row, usize> = HashMap::new();
        for row in main_rows {
            *remaining.entry(row).or_insert(0) += 1;
        }

        let mut added = Vec::new();
        for row in replayed {
            match remaining.get_mut(&row) {
                Some(count) if *count > 0 => *count -= 1,
                _ => added.push(row),
            }
        }

        debug!(table = %plan.table, added = added.len(), "subtracted main rows from replayed table");
        Ok(added)
    }

    /// Keys of the whole main table; the fetched rows suffice when unlimited
    fn main_keys(&self, plan: &MergePlan, main_rows: &[Row]) -> Result<HashSet<PrimaryKey>> {
        match plan.row_limit {
            None => Ok(main_rows.iter().map(|r| r.key_at(&plan.key_positions)).collect()),
            Some(_) => self.db.fetch_keys(&plan.table, &plan.key_columns),
        }
    }
}
