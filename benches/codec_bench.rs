//! Benchmarks for timestamp conversion, column classification and WAL merging

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rusqlite::{params, Connection};
use tableinfo::timestamp::{classify_column, convert, describe, FormatTag, KeywordMatcher, TemporalMatcher};
use tableinfo::wal::wal_path_for;
use tableinfo::{Database, Value, WalReconciler, WalStrategy};
use tempfile::TempDir;

const NEW_YEAR_JST: i64 = 1_704_034_800_000_000;

fn codec_benchmarks(c: &mut Criterion) {
    let value = Value::Integer(NEW_YEAR_JST);
    let marked = Value::Text(format!("➡{}", NEW_YEAR_JST));

    c.bench_function("convert_jst", |b| b.iter(|| convert(black_box(&value), FormatTag::Jst)));
    c.bench_function("convert_filetime", |b| {
        b.iter(|| convert(black_box(&value), FormatTag::Filetime))
    });
    c.bench_function("convert_marked_text", |b| {
        b.iter(|| convert(black_box(&marked), FormatTag::Jst))
    });
    c.bench_function("describe", |b| b.iter(|| describe(black_box(&value))));
}

fn classifier_benchmarks(c: &mut Criterion) {
    let matcher = KeywordMatcher::default().with_keyword("ZSEEN");
    let names = ["Z_PK", "ZTIMESTAMP", "ZTEXT", "ZLASTMODIFIED", "ZSENDER", "ZSEENFLAG"];

    c.bench_function("classify_column", |b| {
        b.iter(|| names.iter().filter(|n| classify_column(black_box(n))).count())
    });
    c.bench_function("keyword_matcher", |b| {
        b.iter(|| names.iter().filter(|n| matcher.is_temporal(black_box(n))).count())
    });
}

fn write_messages(path: &std::path::Path, keys: std::ops::Range<i64>) {
    let conn = Connection::open(path).unwrap();
    conn.execute("CREATE TABLE ZMESSAGE (Z_PK INTEGER PRIMARY KEY, ZTIMESTAMP INTEGER, ZTEXT TEXT)", [])
        .unwrap();
    conn.execute("BEGIN", []).unwrap();
    for pk in keys {
        conn.execute(
            "INSERT INTO ZMESSAGE VALUES (?1, ?2, ?3)",
            params![pk, NEW_YEAR_JST + pk, format!("message {}", pk)],
        )
        .unwrap();
    }
    conn.execute("COMMIT", []).unwrap();
}

fn reconcile_benchmarks(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("talk.sqlite");
    write_messages(&db_path, 0..10_000);
    write_messages(&wal_path_for(&db_path), 9_000..11_000);

    let db = Database::open(&db_path).unwrap();
    let reconciler = WalReconciler::new(&db, WalStrategy::Standalone);

    c.bench_function("reconcile_10k_main_2k_wal", |b| {
        b.iter(|| reconciler.reconcile(black_box("ZMESSAGE"), None).unwrap())
    });
    c.bench_function("reconcile_limited", |b| {
        b.iter(|| reconciler.reconcile(black_box("ZMESSAGE"), Some(100)).unwrap())
    });
}

criterion_group!(benches, codec_benchmarks, classifier_benchmarks, reconcile_benchmarks);
criterion_main!(benches);
