//! Tests for display-side rendering
//!
//! These tests verify:
//! - Temporal cells are converted and their originals kept
//! - Per-column overrides and reformatting
//! - WAL-only row flags

use std::collections::{BTreeSet, HashMap, HashSet};

use tableinfo::display::{render_value, DisplayGrid, RowHandle};
use tableinfo::{FormatTag, KeywordMatcher, ReconciledResult, Row, Value, WalOnlyKeys, WalStatus};

const NEW_YEAR_JST: i64 = 1_704_034_800_000_000;

fn sample_result() -> ReconciledResult {
    ReconciledResult {
        columns: vec![
            "Z_PK".to_string(),
            "ZTIMESTAMP".to_string(),
            "ZTEXT".to_string(),
        ],
        rows: vec![
            Row::new(vec![Value::Integer(1), Value::Integer(NEW_YEAR_JST), Value::from("hi")]),
            Row::new(vec![Value::Integer(2), Value::Null, Value::from("no time")]),
            Row::new(vec![Value::Integer(3), Value::from("pending"), Value::from("wal")]),
        ],
        wal_only: WalOnlyKeys::Indices(BTreeSet::from([2])),
        main_row_count: 2,
        wal_status: WalStatus::Merged {
            source: "standalone".to_string(),
            rows_read: 1,
        },
    }
}

fn build(result: &ReconciledResult) -> DisplayGrid {
    DisplayGrid::build(result, &KeywordMatcher::default(), &HashMap::new(), FormatTag::Jst)
}

#[test]
fn test_temporal_cells_converted() {
    let grid = build(&sample_result());

    assert_eq!(grid.temporal, vec![false, true, false]);
    assert_eq!(grid.cells[0], vec!["1", "2024-01-01 00:00:00", "hi"]);
    assert_eq!(grid.cells[1][1], "");
    assert_eq!(grid.cells[2][1], "pending");
}

#[test]
fn test_originals_kept_for_converted_cells() {
    let grid = build(&sample_result());

    assert_eq!(
        grid.original_value(RowHandle(0), 1),
        Some(&Value::Integer(NEW_YEAR_JST))
    );
    assert_eq!(grid.original_value(RowHandle(1), 1), None);
    assert_eq!(grid.original_value(RowHandle(0), 2), None);
}

#[test]
fn test_wal_rows_flagged() {
    let grid = build(&sample_result());
    assert_eq!(grid.wal_rows, vec![false, false, true]);
    assert_eq!(grid.row_count(), 3);
}

#[test]
fn test_column_override() {
    let overrides = HashMap::from([("ZTIMESTAMP".to_string(), FormatTag::Utc)]);
    let grid = DisplayGrid::build(&sample_result(), &KeywordMatcher::default(), &overrides, FormatTag::Jst);

    assert_eq!(grid.cells[0][1], "2023-12-31 15:00:00");
    assert_eq!(grid.formats[1], FormatTag::Utc);
}

#[test]
fn test_reformat_uses_originals() {
    let mut grid = build(&sample_result());

    assert!(grid.reformat("ZTIMESTAMP", FormatTag::UnixSecond));
    assert_eq!(grid.cells[0][1], "1704034800");
    assert_eq!(grid.cells[2][1], "pending");

    assert!(grid.reformat("ZTIMESTAMP", FormatTag::Jst));
    assert_eq!(grid.cells[0][1], "2024-01-01 00:00:00");
}

#[test]
fn test_reformat_rejects_non_temporal_and_unknown_columns() {
    let mut grid = build(&sample_result());

    assert!(!grid.reformat("ZTEXT", FormatTag::Utc));
    assert!(!grid.reformat("ZMISSING", FormatTag::Utc));
    assert_eq!(grid.cells[0][2], "hi");
}

#[test]
fn test_keyed_result_flags_rows_past_main_count() {
    let mut result = sample_result();
    result.wal_only = WalOnlyKeys::Keys(HashSet::new());
    result.main_row_count = 3;

    let grid = build(&result);
    assert_eq!(grid.wal_rows, vec![false, false, false]);
}

#[test]
fn test_render_value() {
    assert_eq!(render_value(&Value::Null), "");
    assert_eq!(render_value(&Value::Real(1.5)), "1.5");
    assert_eq!(render_value(&Value::Blob(vec![0, 1, 2])), "<3 bytes>");
}
