//! # tableinfo
//!
//! Read-only forensic inspection of a messaging app's SQLite stores:
//! - Committed rows from the main database file
//! - Rows that exist only in the `-wal` sibling (not yet checkpointed)
//! - Deleted messages whose text is still recoverable
//! - Timestamp decoding across UNIX, Cocoa, FILETIME and WebKit epochs
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Presentation (CLI / external viewer)            │
//! │            display::DisplayGrid + timestamp::convert         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Inspector                              │
//! │        list_tables / get_contents / find_deleted             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────┐
//!          │            │                 │
//!          ▼            ▼                 ▼
//!   ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//!   │   Schema    │ │     WAL     │ │   Deleted   │
//!   │   Reader    │ │ Reconciler  │ │   Finder    │
//!   └──────┬──────┘ └──────┬──────┘ └──────┬──────┘
//!          │               │               │
//!          ▼               ▼               ▼
//!   ┌─────────────────────────────┐ ┌─────────────┐
//!   │  Database (ro, immutable)   │ │  -wal file  │
//!   └─────────────────────────────┘ └─────────────┘
//! ```
//!
//! Everything is synchronous and single-threaded. Each call takes its inputs
//! explicitly and returns a fresh result; there is no shared mutable state.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod value;

pub mod storage;
pub mod wal;
pub mod deleted;
pub mod timestamp;
pub mod display;
pub mod inspector;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{InspectError, Result};
pub use config::{Config, DeletionConvention, WalStrategy};
pub use value::{PrimaryKey, Row, Value};
pub use storage::{Column, ColumnSchemaReader, Database, RowRange};
pub use wal::{ReconciledResult, WalOnlyKeys, WalReconciler, WalStatus};
pub use deleted::{DeletedRecord, DeletedRecordFinder};
pub use timestamp::{classify_column, convert, FormatTag, KeywordMatcher, TemporalMatcher};
pub use inspector::{find_deleted, get_contents, list_tables, Inspector, TableContents, TableSummary};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tableinfo
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
