//! WAL row sources
//!
//! Each source reads the same-named table out of the `-wal` sibling through
//! its own connection. Every failure is reported as `WalRead`.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::config::WalStrategy;
use crate::error::{InspectError, Result};
use crate::storage::connection::{open_read_only_connection, select_rows};
use crate::value::Row;

use super::header::{sniff, wal_path_for, SiblingKind};

/// A read-only provider of rows recovered from a WAL sibling
pub trait WalSource {
    /// Short name reported in `WalStatus::Merged`
    fn label(&self) -> &'static str;

    /// Rows of `table` projected onto `columns`, in the main table's order
    fn fetch_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Row>>;

    /// True when `fetch_rows` returns the main file's rows as well as the
    /// WAL's (the table as it reads after frame replay)
    fn includes_main(&self) -> bool {
        false
    }
}

// =============================================================================
// Standalone
// =============================================================================

/// Opens the sibling itself as a database file
pub struct StandaloneWal {
    path: PathBuf,
}

impl StandaloneWal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WalSource for StandaloneWal {
    fn label(&self) -> &'static str {
        "standalone"
    }

    fn fetch_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Row>> {
        let conn = open_read_only_connection(&self.path).map_err(|e| wal_err(&self.path, e))?;
        select_rows(&conn, table, columns, None).map_err(|e| wal_err(&self.path, e))
    }
}

// =============================================================================
// Overlay
// =============================================================================

/// Lets SQLite apply the WAL to a private copy of the main file
///
/// The main file and the sibling are copied into a fresh temporary directory
/// as `snapshot.db` and `snapshot.db-wal`; opening the copy replays the
/// committed frames. The directory is removed when the read finishes.
pub struct OverlayWal {
    main_path: PathBuf,
    wal_path: PathBuf,
}

impl OverlayWal {
    const SNAPSHOT_NAME: &'static str = "snapshot.db";

    pub fn new(main_path: impl Into<PathBuf>, wal_path: impl Into<PathBuf>) -> Self {
        Self {
            main_path: main_path.into(),
            wal_path: wal_path.into(),
        }
    }
}

impl WalSource for OverlayWal {
    fn label(&self) -> &'static str {
        "overlay"
    }

    fn includes_main(&self) -> bool {
        true
    }

    fn fetch_rows(&self, table: &str, columns: &[String]) -> Result<Vec<Row>> {
        let dir = tempfile::Builder::new()
            .prefix("tableinfo-overlay")
            .tempdir()
            .map_err(|e| InspectError::WalRead(format!("cannot create overlay directory: {}", e)))?;

        let snapshot = dir.path().join(Self::SNAPSHOT_NAME);
        fs::copy(&self.main_path, &snapshot).map_err(|e| wal_err(&self.main_path, e))?;
        fs::copy(&self.wal_path, wal_path_for(&snapshot)).map_err(|e| wal_err(&self.wal_path, e))?;

        debug!(snapshot = %snapshot.display(), "opening WAL overlay snapshot");

        // Read-write so SQLite can rebuild the wal-index; only the copy is touched
        let conn = Connection::open(&snapshot).map_err(|e| wal_err(&self.wal_path, e))?;
        select_rows(&conn, table, columns, None).map_err(|e| wal_err(&self.wal_path, e))
    }
}

// =============================================================================
// Empty
// =============================================================================

/// Zero-length sibling: present, but contributes nothing
pub struct EmptyWal;

impl WalSource for EmptyWal {
    fn label(&self) -> &'static str {
        "empty"
    }

    fn fetch_rows(&self, _table: &str, _columns: &[String]) -> Result<Vec<Row>> {
        Ok(Vec::new())
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Pick a source for the sibling of `db_path`
///
/// Returns `Ok(None)` when there is no sibling. With `Auto`, the sibling's
/// leading bytes decide; anything unrecognized is a `WalRead` error.
pub fn open_wal_source(db_path: &Path, strategy: WalStrategy) -> Result<Option<Box<dyn WalSource>>> {
    let wal_path = wal_path_for(db_path);
    if !wal_path.is_file() {
        return Ok(None);
    }

    let source: Box<dyn WalSource> = match strategy {
        WalStrategy::Standalone => Box::new(StandaloneWal::new(wal_path)),
        WalStrategy::Overlay => Box::new(OverlayWal::new(db_path, wal_path)),
        WalStrategy::Auto => match sniff(&wal_path)? {
            SiblingKind::Empty => Box::new(EmptyWal),
            SiblingKind::Database => Box::new(StandaloneWal::new(wal_path)),
            SiblingKind::Wal(header) => {
                if !header.is_plausible() {
                    warn!(
                        path = %wal_path.display(),
                        checksum_valid = header.checksum_valid,
                        "WAL header looks damaged; SQLite may ignore its frames"
                    );
                }
                Box::new(OverlayWal::new(db_path, wal_path))
            }
        },
    };

    Ok(Some(source))
}

fn wal_err(path: &Path, e: impl std::fmt::Display) -> InspectError {
    InspectError::WalRead(format!("{}: {}", path.display(), e))
}
