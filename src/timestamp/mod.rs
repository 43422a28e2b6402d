//! Timestamp Module
//!
//! Decodes integer-encoded timestamps for display.
//!
//! ## Responsibilities
//! - Name the supported encodings and display zones (`FormatTag`)
//! - Convert a cell value under a format into a display string
//! - Decide from a column name alone whether a column is temporal
//!
//! ## Encodings
//! ```text
//! ┌──────────────────┬──────────────┬───────────────────────┬──────────┐
//! │ Tag              │ Epoch        │ Unit                  │ Rendered │
//! ├──────────────────┼──────────────┼───────────────────────┼──────────┤
//! │ JST/UTC/GMT/zone │ 1970-01-01   │ microseconds          │ zone     │
//! │ UNIX_second      │ 1970-01-01   │ microseconds → s      │ integer  │
//! │ UNIX_millisecond │ 1970-01-01   │ microseconds → ms     │ integer  │
//! │ UNIX_microsecond │ 1970-01-01   │ microseconds          │ integer  │
//! │ MAC / COCOA      │ 2001-01-01   │ microseconds          │ JST      │
//! │ WEBKIT / CHROME  │ 1601-01-01   │ microseconds          │ JST      │
//! │ FIREFOX          │ 1601-01-01   │ microseconds          │ JST      │
//! │ FILETIME         │ 1601-01-01   │ 100 ns ticks          │ JST      │
//! └──────────────────┴──────────────┴───────────────────────┴──────────┘
//! ```
//!
//! Conversion is pure: no caches, no global state. The presentation layer
//! keeps its own record of pre-conversion values (see `display`).

mod classifier;
mod codec;
mod format;

pub use classifier::{classify_column, KeywordMatcher, TemporalMatcher, DEFAULT_TIMESTAMP_KEYWORDS};
pub use codec::{convert, convert_i64, describe, try_convert, ConversionError, DECORATIVE_MARKER};
pub use format::FormatTag;
