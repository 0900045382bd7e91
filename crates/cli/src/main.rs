//! zdb command-line driver.
//!
//! # Usage
//!
//! ```bash
//! # write the sample agg1d table and print it
//! zdb demo
//!
//! # print rows 10..20 of an existing table
//! zdb --config zdb.conf dump agg1d --from 10 --to 20
//!
//! # print timestamps with the sym and volume columns only
//! zdb dump agg1d --column sym --column volume
//! ```
//!
//! The store root comes from `[filesystem] path` in the config file and can
//! be overridden with `--root`. Logging is controlled through `RUST_LOG`.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use table::{StoreConfig, Table};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod demo;

#[derive(Parser, Debug)]
#[command(name = "zdb", version, about = "Columnar store for timestamped rows")]
struct Args {
    /// Store configuration file
    #[arg(short, long, value_name = "FILE", default_value = "zdb.conf")]
    config: PathBuf,

    /// Store root, overriding the config file
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the agg1d sample table, write five rows, flush and print it
    Demo,
    /// Print the rows of an existing table
    Dump {
        table: String,
        /// First row to print
        #[arg(long, default_value_t = 0)]
        from: u64,
        /// End of the range (exclusive); defaults to the row count
        #[arg(long)]
        to: Option<u64>,
        /// Print only `ts` and these columns (repeatable)
        #[arg(long = "column", value_name = "NAME")]
        columns: Vec<String>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = StoreConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(root) = args.root {
        config.root = root;
    }
    info!(root = %config.root.display(), sync = config.sync, "store configured");

    match args.command {
        Command::Demo => run_demo(&config),
        Command::Dump {
            table,
            from,
            to,
            columns,
        } => {
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
            dump(&config, &table, from, to, &columns, &mut io::stdout().lock())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_demo(config: &StoreConfig) -> Result<()> {
    let mut agg1d = Table::create(config, demo::agg1d_schema()?)?;
    agg1d.write_literals(demo::agg1d_rows())?;
    let summary = agg1d.flush()?;
    info!(rows = summary.rows_written, "demo rows flushed");

    for row in agg1d.read_all()? {
        println!("{}", row.display(agg1d.schema()));
    }
    Ok(())
}

fn dump(
    config: &StoreConfig,
    name: &str,
    from: u64,
    to: Option<u64>,
    columns: &[&str],
    out: &mut impl Write,
) -> Result<()> {
    let table = Table::open(config, name)?;
    let to = to.unwrap_or_else(|| table.row_count());

    if columns.is_empty() {
        for row in table.read(from, to)? {
            writeln!(out, "{}", row.display(table.schema()))?;
        }
    } else {
        let projected = table.projection(columns)?;
        for row in table.read_columns(columns, from, to)? {
            writeln!(out, "{}", row.display(&projected))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn dump_defaults() {
        let args = Args::try_parse_from(["zdb", "dump", "agg1d"]).unwrap();
        assert_eq!(args.config, PathBuf::from("zdb.conf"));
        match args.command {
            Command::Dump { table, from, to, columns } => {
                assert_eq!(table, "agg1d");
                assert_eq!(from, 0);
                assert_eq!(to, None);
                assert!(columns.is_empty());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn column_flag_repeats() {
        let args =
            Args::try_parse_from(["zdb", "dump", "agg1d", "--column", "sym", "--column", "volume"])
                .unwrap();
        match args.command {
            Command::Dump { columns, .. } => assert_eq!(columns, ["sym", "volume"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn dump_prints_projected_rows() -> Result<()> {
        let dir = tempdir()?;
        let config = StoreConfig::new(dir.path());
        {
            let mut t = Table::create(&config, demo::agg1d_schema()?)?;
            t.write_literals(demo::agg1d_rows())?;
            t.flush()?;
        }

        let mut out = Vec::new();
        dump(&config, "agg1d", 1, Some(3), &["volume"], &mut out)?;
        let text = String::from_utf8(out)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2004-01-02 21:00:00.001234556"), "{text}");
        assert!(lines[0].ends_with("212312000"), "{text}");
        assert!(!text.contains("AAPL"), "{text}");

        let mut out = Vec::new();
        dump(&config, "agg1d", 0, None, &[], &mut out)?;
        assert_eq!(String::from_utf8(out)?.lines().count(), 5);

        let mut out = Vec::new();
        assert!(dump(&config, "agg1d", 0, None, &["vwap"], &mut out).is_err());
        Ok(())
    }
}
