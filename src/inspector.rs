//! Inspector
//!
//! The table content service that the presentation layer talks to.
//!
//! ## Responsibilities
//! - Open the main database read-only
//! - List tables with row counts
//! - Produce display-ready table contents, with or without WAL merging
//! - Fetch a primary-key range from the main file
//! - Run the deleted-message query
//!
//! Timestamp conversion is not applied here; callers convert per displayed
//! cell (see `display`).

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::deleted::{DeletedRecord, DeletedRecordFinder};
use crate::error::{InspectError, Result};
use crate::storage::catalog::key_names;
use crate::storage::{Column, ColumnSchemaReader, Database, RowRange};
use crate::timestamp::KeywordMatcher;
use crate::value::Row;
use crate::wal::{sniff, wal_path_for, ReconciledResult, SiblingKind, WalHeader, WalOnlyKeys, WalReconciler, WalStatus};

/// A table name with its total row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,

    /// `None` when the table cannot be counted (e.g. a virtual table whose
    /// module is not available)
    pub row_count: Option<u64>,
}

/// Display-ready contents of one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableContents {
    /// Merged rows and their provenance
    pub result: ReconciledResult,

    /// Authoritative main-table count, independent of `row_limit`
    ///
    /// For a range fetch this counts the rows inside the range.
    pub row_count: u64,
}

impl TableContents {
    pub fn columns(&self) -> &[String] {
        &self.result.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.result.rows
    }

    pub fn wal_only(&self) -> &WalOnlyKeys {
        &self.result.wal_only
    }

    /// True when `row_limit` hid some main rows
    pub fn is_truncated(&self) -> bool {
        (self.result.main_row_count as u64) < self.row_count
    }
}

/// Read-only inspection session over one database file
pub struct Inspector {
    /// Session configuration
    config: Config,

    /// Main database handle
    db: Database,
}

impl Inspector {
    /// Open a database file with the given config
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let db = Database::open(path)?;
        Ok(Self { config, db })
    }

    /// Open with default config
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, Config::default())
    }

    /// All tables with their row counts
    ///
    /// A table whose count query fails is still listed, with no count.
    pub fn list_tables(&self) -> Result<Vec<TableSummary>> {
        let mut summaries = Vec::new();
        for name in self.db.list_tables()? {
            let row_count = match self.db.row_count(&name) {
                Ok(count) => Some(count),
                Err(InspectError::Query(msg)) => {
                    warn!(table = %name, error = %msg, "row count unavailable");
                    None
                }
                Err(e) => return Err(e),
            };
            summaries.push(TableSummary { name, row_count });
        }
        Ok(summaries)
    }

    /// Column metadata for a table
    pub fn columns(&self, table: &str) -> Result<Vec<Column>> {
        ColumnSchemaReader::new(&self.db).read(table)
    }

    /// Contents of `table`, optionally merged with WAL-only rows
    ///
    /// `row_limit` bounds the main-file rows only; WAL-only rows are always
    /// included in full.
    pub fn get_contents(&self, table: &str, with_wal: bool, row_limit: Option<usize>) -> Result<TableContents> {
        if row_limit == Some(0) {
            return Err(InspectError::Config("row limit must be positive".to_string()));
        }

        let reconciler = WalReconciler::new(&self.db, self.config.wal_strategy);
        let result = if with_wal {
            reconciler.reconcile(table, row_limit)?
        } else {
            self.plain_fetch(table, row_limit)?
        };

        let row_count = self.db.row_count(table)?;
        debug!(
            table,
            shown = result.rows.len(),
            total = row_count,
            wal_only = result.wal_only.len(),
            "table contents ready"
        );

        Ok(TableContents { result, row_count })
    }

    /// Range over the single-column primary key of `table`
    ///
    /// Fails with `Config` when the table has no primary key or a composite one.
    pub fn key_range(&self, table: &str, start: i64, end: i64) -> Result<RowRange> {
        let mut keys = key_names(&self.columns(table)?);
        match keys.len() {
            1 => Ok(RowRange::new(keys.remove(0), start, end)),
            0 => Err(InspectError::Config(format!("{} has no primary key", table))),
            _ => Err(InspectError::Config(format!(
                "{} has a composite primary key ({})",
                table,
                keys.join(", ")
            ))),
        }
    }

    /// Main-file rows of `table` whose `range.column` lies within the range
    ///
    /// Both ends are inclusive. The WAL sibling is never consulted and
    /// `row_limit` applies to the filtered rows.
    pub fn get_range(&self, table: &str, range: &RowRange, row_limit: Option<usize>) -> Result<TableContents> {
        if row_limit == Some(0) {
            return Err(InspectError::Config("row limit must be positive".to_string()));
        }
        if range.start > range.end {
            return Err(InspectError::Config(format!(
                "range start {} is past its end {}",
                range.start, range.end
            )));
        }

        let columns = self.columns(table)?;
        if !columns.iter().any(|c| c.name == range.column) {
            return Err(InspectError::Schema(format!(
                "no column {} in {}",
                range.column, table
            )));
        }
        let keyed = columns.iter().any(|c| c.is_primary_key);
        let names: Vec<String> = columns.into_iter().map(|c| c.name).collect();

        let rows = self.db.fetch_range(table, &names, range, row_limit)?;
        let result = ReconciledResult::main_only(names, rows, keyed, WalStatus::Skipped);
        let row_count = self.db.range_count(table, range)?;
        debug!(
            table,
            column = %range.column,
            start = range.start,
            end = range.end,
            shown = result.rows.len(),
            "range contents ready"
        );

        Ok(TableContents { result, row_count })
    }

    /// Deleted-but-recoverable messages in `table`
    pub fn find_deleted(&self, table: &str) -> Result<Vec<DeletedRecord>> {
        DeletedRecordFinder::new(&self.db, &self.config.deletion).find_deleted(table)
    }

    /// Header of the `-wal` sibling, if it is a genuine WAL
    pub fn wal_header(&self) -> Result<Option<WalHeader>> {
        let wal_path = wal_path_for(self.db.path());
        if !wal_path.is_file() {
            return Ok(None);
        }
        match sniff(&wal_path)? {
            SiblingKind::Wal(header) => Ok(Some(header)),
            SiblingKind::Empty | SiblingKind::Database => Ok(None),
        }
    }

    /// Classifier built from the configured keywords
    pub fn matcher(&self) -> KeywordMatcher {
        KeywordMatcher::new(&self.config.timestamp_keywords)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn plain_fetch(&self, table: &str, row_limit: Option<usize>) -> Result<ReconciledResult> {
        let columns = self.columns(table)?;
        let keyed = columns.iter().any(|c| c.is_primary_key);
        let names: Vec<String> = columns.into_iter().map(|c| c.name).collect();
        let rows = self.db.fetch_rows(table, &names, row_limit)?;
        Ok(ReconciledResult::main_only(names, rows, keyed, WalStatus::Skipped))
    }
}

// =============================================================================
// One-shot Helpers
// =============================================================================

/// `(table, row_count)` for every table in the file at `path`
pub fn list_tables(path: impl AsRef<Path>) -> Result<Vec<TableSummary>> {
    Inspector::open_path(path)?.list_tables()
}

/// Contents of `table` in the file at `path`
pub fn get_contents(
    table: &str,
    path: impl AsRef<Path>,
    with_wal: bool,
    row_limit: Option<usize>,
) -> Result<TableContents> {
    Inspector::open_path(path)?.get_contents(table, with_wal, row_limit)
}

/// Deleted messages in `table` of the file at `path`
pub fn find_deleted(table: &str, path: impl AsRef<Path>) -> Result<Vec<DeletedRecord>> {
    Inspector::open_path(path)?.find_deleted(table)
}
