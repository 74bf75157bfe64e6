//! xml2csv: Extract records from an XML document into CSV files
//!
//! Usage:
//!   # Use ./specs.json, write CSV files to the home directory
//!   xml2csv .
//!
//!   # Write CSV files to a directory
//!   xml2csv catalog.json --output-dir ./out
//!
//!   # Print rows instead, only the 11th to 20th matches
//!   xml2csv catalog.json --print --start-from 11 --max-count 10

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use xml2csv::{default_output_dir, Converter, Output, Specification};

#[derive(Parser, Debug)]
#[command(name = "xml2csv")]
#[command(about = "Extract records from an XML document into CSV files", long_about = None)]
struct Args {
    /// Specification file, or a directory holding specs.json
    #[arg(value_name = "SPEC")]
    spec: PathBuf,

    /// Directory for the CSV files (default: home directory)
    #[arg(long, short = 'o', conflicts_with = "print")]
    output_dir: Option<PathBuf>,

    /// Print rows to stdout instead of writing CSV files
    #[arg(long)]
    print: bool,

    /// 1-based index of the first parent match to consider (overrides the specification)
    #[arg(long)]
    start_from: Option<u64>,

    /// Maximum number of rows per parent group, negative for no limit
    /// (overrides the specification)
    #[arg(long, allow_negative_numbers = true)]
    max_count: Option<i64>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let spec = Specification::from_path(&args.spec)
        .and_then(|spec| spec.with_window(args.start_from, args.max_count))
        .with_context(|| format!("Failed to load specification {}", args.spec.display()))?;

    let output = if args.print {
        Output::Print
    } else {
        Output::Csv {
            dir: args.output_dir.unwrap_or_else(default_output_dir),
        }
    };

    let report = Converter::new(spec)
        .run(&output)
        .context("Conversion failed")?;

    log::info!(
        "{} rows from {} groups",
        report.rows_written(),
        report.groups.len()
    );

    let failed: Vec<String> = report
        .failures()
        .map(|g| g.label.clone().unwrap_or_else(|| g.parent_expression.clone()))
        .collect();
    if !failed.is_empty() {
        bail!("{} group(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
