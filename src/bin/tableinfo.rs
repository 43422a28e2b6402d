//! tableinfo CLI
//!
//! Command-line front end over the tableinfo library.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tableinfo::display::DisplayGrid;
use tableinfo::timestamp::describe;
use tableinfo::{Config, FormatTag, Inspector, TemporalMatcher, Value, WalStrategy};
use tracing_subscriber::{fmt, EnvFilter};

/// tableinfo
#[derive(Parser, Debug)]
#[command(name = "tableinfo")]
#[command(about = "Inspect messaging-app SQLite stores, including WAL-only rows")]
#[command(version)]
struct Args {
    /// How to read the -wal sibling
    #[arg(long, value_enum, default_value = "auto", global = true)]
    wal_strategy: StrategyArg,

    /// Extra keyword marking a column as a timestamp (repeatable)
    #[arg(long = "keyword", global = true)]
    keywords: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StrategyArg {
    Auto,
    Standalone,
    Overlay,
}

impl From<StrategyArg> for WalStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => WalStrategy::Auto,
            StrategyArg::Standalone => WalStrategy::Standalone,
            StrategyArg::Overlay => WalStrategy::Overlay,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List tables and row counts
    Tables {
        /// Database file
        db: PathBuf,
    },

    /// List a table's columns
    Schema {
        /// Database file
        db: PathBuf,

        /// Table name (exact match)
        table: String,
    },

    /// Show table contents
    Show {
        /// Database file
        db: PathBuf,

        /// Table name (exact match)
        table: String,

        /// Maximum main-file rows (WAL-only rows are always shown)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip WAL reconciliation
        #[arg(long)]
        no_wal: bool,

        /// Only primary keys in START..END, both inclusive (main file only)
        #[arg(long, value_name = "START..END", value_parser = parse_pk_range, allow_hyphen_values = true)]
        pk_range: Option<(i64, i64)>,

        /// Default format for timestamp columns
        #[arg(short, long, default_value = "JST", value_parser = parse_format)]
        format: FormatTag,

        /// Per-column format, COLUMN=TAG (repeatable)
        #[arg(long = "column-format", value_parser = parse_column_format)]
        column_formats: Vec<(String, FormatTag)>,

        /// Print the reconciled result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List deleted messages that still carry text
    Deleted {
        /// Database file
        db: PathBuf,

        /// Table name (exact match)
        table: String,
    },

    /// Convert a timestamp value
    Convert {
        /// Integer value (a leading ➡ is ignored)
        value: String,

        /// Target format (repeatable); all formats when omitted
        #[arg(short, long, value_parser = parse_format)]
        format: Vec<FormatTag>,
    },

    /// Show the -wal sibling header
    WalInfo {
        /// Database file
        db: PathBuf,
    },
}

fn main() {
    // Logs on stderr, table output on stdout
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tableinfo=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("tableinfo v{}", tableinfo::VERSION);

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> tableinfo::Result<()> {
    let config = args
        .keywords
        .iter()
        .fold(Config::builder().wal_strategy(args.wal_strategy.into()), |b, k| {
            b.extra_timestamp_keyword(k)
        })
        .build();

    match args.command {
        Commands::Tables { db } => {
            let inspector = Inspector::open(&db, config)?;
            for summary in inspector.list_tables()? {
                let count = summary
                    .row_count
                    .map_or_else(|| "?".to_string(), |n| n.to_string());
                println!("{}\t{}", summary.name, count);
            }
        }

        Commands::Schema { db, table } => {
            let inspector = Inspector::open(&db, config)?;
            let matcher = inspector.matcher();
            for col in inspector.columns(&table)? {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}{}",
                    col.position,
                    col.name,
                    col.declared_type,
                    if col.not_null { "NOT NULL" } else { "" },
                    col.default_value.as_deref().unwrap_or(""),
                    if col.is_primary_key { "PK" } else { "" },
                    if matcher.is_temporal(&col.name) { "\ttimestamp" } else { "" },
                );
            }
        }

        Commands::Show {
            db,
            table,
            limit,
            no_wal,
            pk_range,
            format,
            column_formats,
            json,
        } => {
            let inspector = Inspector::open(&db, config)?;
            let contents = match pk_range {
                Some((start, end)) => {
                    let range = inspector.key_range(&table, start, end)?;
                    inspector.get_range(&table, &range, limit)?
                }
                None => inspector.get_contents(&table, !no_wal, limit)?,
            };

            if json {
                let text = serde_json::to_string_pretty(&contents).map_err(std::io::Error::from)?;
                println!("{}", text);
                return Ok(());
            }

            let overrides: HashMap<String, FormatTag> = column_formats.into_iter().collect();
            let matcher = inspector.matcher();
            let grid = DisplayGrid::build(&contents.result, &matcher, &overrides, format);

            println!("WAL\t{}", grid.columns.join("\t"));
            for (cells, wal) in grid.cells.iter().zip(&grid.wal_rows) {
                println!("{}\t{}", if *wal { "*" } else { "" }, cells.join("\t"));
            }
            println!(
                "-- shown {} of {} rows (WAL-only: {}) [{:?}]",
                grid.row_count(),
                contents.row_count,
                contents.result.wal_only_count(),
                contents.result.wal_status,
            );
        }

        Commands::Deleted { db, table } => {
            let inspector = Inspector::open(&db, config)?;
            let display_format = inspector.config().display_format;
            for record in inspector.find_deleted(&table)? {
                println!(
                    "{}\t{}\t{}",
                    tableinfo::convert(&record.timestamp, display_format),
                    record.row_id.to_text_lossy(),
                    record.text
                );
            }
        }

        Commands::Convert { value, format } => {
            let value = Value::Text(value);
            if format.is_empty() {
                for (tag, text) in describe(&value) {
                    println!("{}\t{}", tag, text);
                }
            } else {
                for tag in format {
                    println!("{}\t{}", tag, tableinfo::convert(&value, tag));
                }
            }
        }

        Commands::WalInfo { db } => {
            let inspector = Inspector::open(&db, config)?;
            match inspector.wal_header()? {
                Some(header) => {
                    let text = serde_json::to_string_pretty(&header).map_err(std::io::Error::from)?;
                    println!("{}", text);
                }
                None => println!("no WAL header"),
            }
        }
    }

    Ok(())
}

fn parse_format(s: &str) -> Result<FormatTag, String> {
    s.parse::<FormatTag>().map_err(|e| e.to_string())
}

fn parse_column_format(s: &str) -> Result<(String, FormatTag), String> {
    let (column, tag) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=TAG, got {:?}", s))?;
    Ok((column.to_string(), parse_format(tag)?))
}

fn parse_pk_range(s: &str) -> Result<(i64, i64), String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got {:?}", s))?;
    let bound = |b: &str| b.trim().parse::<i64>().map_err(|e| format!("bad bound {:?}: {}", b, e));
    Ok((bound(start)?, bound(end)?))
}
