//! Command-line arguments for the quote sync.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::time::Duration;

use clap::Parser;
use quote_common::JobPreset;
use quote_common::net::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS, QUOTE_URL_BASE};
use quote_sync::FetchConfig;
use quote_sync::fetcher::DEFAULT_USER_AGENT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// CSV file holding the sheet to update.
    #[clap(long)]
    pub grid: String,

    /// Sheet name the jobs address.
    #[clap(long, default_value = "Sheet1")]
    pub sheet: String,

    /// Built-in job set to run.
    #[clap(long, value_enum, default_value_t = JobPreset::Prices)]
    pub job: JobPreset,

    /// JSON file with custom jobs; replaces `--job`.
    #[clap(long)]
    pub jobs_file: Option<String>,

    /// Quote endpoint URL prefix.
    #[clap(long, default_value = QUOTE_URL_BASE)]
    pub base_url: String,

    /// Timeout of the first fetch attempt, in seconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Fetch attempts before giving up.
    #[clap(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// User-Agent header sent to the endpoint.
    #[clap(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Where to write the updated sheet; defaults to `--grid`.
    #[clap(long)]
    pub output: Option<String>,
}

impl Args {
    /// Fetch settings taken from the arguments.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_attempts: self.max_attempts,
            user_agent: self.user_agent.clone(),
        }
    }
}
