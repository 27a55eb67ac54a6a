//! Sync job definitions.
//!
//! A `SyncJob` names a key range and the destination columns that receive the
//! price and currency of each key, in that order. Jobs come either from a
//! built-in `JobPreset` or from a JSON file such as:
//!
//! ```json
//! [{ "keys": "A2:A200", "columns": ["B", "C"] }]
//! ```
use std::io::Read;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::address::{Address, AddressRange};
use crate::error::SyncError;
use crate::result::Result;

/// One key column and its destination columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncJob {
    /// Key range, e.g. `A2:A200`.
    pub keys: String,
    /// Destination column names, filled with record fields by position.
    pub columns: Vec<String>,
}

impl SyncJob {
    /// Creates a job from a key range and destination column names.
    pub fn new(keys: &str, columns: &[&str]) -> Self {
        SyncJob {
            keys: String::from(keys),
            columns: columns.iter().map(|c| String::from(*c)).collect(),
        }
    }

    /// Parsed key range.
    pub fn key_range(&self) -> Result<AddressRange> {
        AddressRange::parse(&self.keys)
    }

    /// Zero-based destination column indices, in declared order.
    pub fn destination_columns(&self) -> Result<Vec<u32>> {
        if self.columns.is_empty() {
            return Err(SyncError::InvalidJob(format!(
                "job for keys {} has no destination columns",
                self.keys
            )));
        }
        self.columns
            .iter()
            .map(|name| Address::parse(name).map(|addr| addr.column))
            .collect()
    }

    /// Read a JSON array of jobs.
    pub fn load_all<R: Read>(reader: R) -> Result<Vec<SyncJob>> {
        let jobs: Vec<SyncJob> = serde_json::from_reader(reader)?;
        if jobs.is_empty() {
            return Err(SyncError::InvalidJob("job file lists no jobs".into()));
        }
        for job in &jobs {
            job.key_range()?;
            job.destination_columns()?;
        }
        Ok(jobs)
    }
}

/// Built-in job sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumString)]
#[clap(rename_all = "lower")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum JobPreset {
    /// Equity prices: keys in `A2:A200`, price to `B`, currency to `C`.
    Prices,
    /// FX rates: two independent key/value column pairs.
    Fx,
}

impl JobPreset {
    /// Jobs making up the preset, run in order.
    pub fn jobs(self) -> Vec<SyncJob> {
        match self {
            JobPreset::Prices => vec![SyncJob::new("A2:A200", &["B", "C"])],
            JobPreset::Fx => vec![
                SyncJob::new("G2:G200", &["H"]),
                SyncJob::new("J2:J200", &["I"]),
            ],
        }
    }
}
