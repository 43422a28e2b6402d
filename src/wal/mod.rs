//! Write-Ahead Log (WAL) Module
//!
//! Recovers rows that exist only in a database's `-wal` sibling.
//!
//! ## Responsibilities
//! - Locate the sibling by fixed suffix (`<db>-wal`)
//! - Sniff what the sibling is (standalone database or genuine WAL)
//! - Read the same-named table out of it as an independent source
//! - Merge with the main rows by primary-key set difference
//!
//! ## WAL Header Format (big-endian)
//! ```text
//! ┌───────────┬───────────┬───────────┬───────────┐
//! │ Magic (4) │Version (4)│PageSize(4)│CkptSeq (4)│
//! ├───────────┼───────────┼───────────┼───────────┤
//! │ Salt1 (4) │ Salt2 (4) │ Cksum1(4) │ Cksum2(4) │
//! └───────────┴───────────┴───────────┴───────────┘
//! followed by frames of (24-byte frame header + one page)
//! ```
//!
//! ## Consistency
//! The main read and the WAL read are separate connections with no shared
//! snapshot. If the files change between the two reads the merge reflects
//! neither state exactly. Inputs are expected to be static forensic copies.

mod header;
mod reconciler;
mod source;

pub use header::{sniff, wal_checksum, wal_path_for, SiblingKind, WalHeader, WAL_HEADER_SIZE, WAL_SUFFIX};
pub use reconciler::{ReconciledResult, RowOrigin, WalOnlyKeys, WalReconciler, WalStatus};
pub use source::{open_wal_source, EmptyWal, OverlayWal, StandaloneWal, WalSource};
