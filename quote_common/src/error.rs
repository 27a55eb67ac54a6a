//! Error types shared between the common library and the sync binary.
//!
//! The `SyncError` enum unifies the failure cases of address parsing, job
//! loading, grid access and quote fetching, allowing crates to propagate a
//! single error type.
use std::io;

use thiserror::Error;

/// Unified error type shared by the workspace.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A cell name or numeric coordinate could not be turned into an address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A sync job definition is malformed (bad key range, no columns, etc.).
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// The grid has no sheet with the given name.
    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    /// Failure reported by the grid backend while loading or saving cells.
    #[error("Grid error: {0}")]
    Grid(String),

    /// A single fetch attempt failed (transport error, timeout, bad status).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Every fetch attempt for the URL failed; nothing was written.
    #[error("Fetch URL {0} FAILED")]
    FetchFailed(String),

    /// I/O error originating from the standard library or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while decoding a JSON job file via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
