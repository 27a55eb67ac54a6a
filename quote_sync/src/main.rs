//! Quote Sync: fills a sheet with market quotes for the tickers listed in it.
//!
//! It loads a CSV file as a sheet, reads each job's key column, classifies the
//! keys into endpoint tickers, fetches their quotes with retries and writes price
//! and currency into the job's destination columns. The sheet is saved only when
//! every job succeeded.
//!
//! Usage example (CLI):
//! ```bash
//! quote_sync --grid ./portfolio.csv --job prices
//! quote_sync --grid ./portfolio.csv --job fx --output ./portfolio-fx.csv
//! quote_sync --grid ./portfolio.csv --jobs-file ./jobs.json
//! ```
#![warn(missing_docs)]
mod args;

use crate::args::Args;
use clap::Parser;
use log::{error, info};
use quote_common::{Result, SyncError, SyncJob};
use quote_sync::{HttpTransport, MemoryGrid, QuoteFetcher, QuoteSync};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

fn main() -> Result<(), SyncError> {
    init_logger();
    let args = Args::parse();

    let jobs = match &args.jobs_file {
        Some(path) => {
            let file = File::open(normalize_path(path))?;
            SyncJob::load_all(BufReader::new(file))?
        }
        None => args.job.jobs(),
    };

    let grid_path = normalize_path(&args.grid);
    if !is_file_exist(&grid_path) {
        return Err(SyncError::Grid(format!(
            "grid file {} not found",
            grid_path.display()
        )));
    }
    let mut grid = MemoryGrid::new();
    grid.load_csv(&args.sheet, BufReader::new(File::open(&grid_path)?))?;
    info!("Loaded sheet {} from {}", args.sheet, grid_path.display());

    let config = args.fetch_config();
    let transport = HttpTransport::from_config(&config)?;
    let sync = QuoteSync::new(QuoteFetcher::new(transport, &config));

    for job in &jobs {
        match sync.run(&mut grid, &args.sheet, job) {
            Ok(report) => info!("Job {} -> {:?}: {}", job.keys, job.columns, report),
            Err(e) => {
                error!("Job {} failed: {}", job.keys, e);
                return Err(e);
            }
        }
    }

    let output = args
        .output
        .as_deref()
        .map(normalize_path)
        .unwrap_or(grid_path);
    grid.save_csv(&args.sheet, File::create(&output)?)?;
    info!("Processing finished, sheet written to {}", output.display());
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &PathBuf) -> bool {
    path.exists() && path.is_file()
}
