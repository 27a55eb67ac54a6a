//!
//! Common types and utilities for synchronizing market quotes into a sheet.
//!
//! This crate aggregates:
//! - `error`: unified error type `SyncError` used across the workspace.
//! - `result`: handy `Result<T, SyncError>` alias.
//! - `address`: cell addresses and ranges (`"AZ12"` <-> zero-based coordinates).
//! - `tickers`: classification of raw sheet keys into endpoint tickers.
//! - `quote`: quote records and the tolerant response parser.
//! - `job`: sync job definitions and built-in presets.
//! - `net`: endpoint constants, URL building and body decoding.
#![warn(missing_docs)]
pub mod address;
pub mod error;
pub mod job;
pub mod net;
pub mod quote;
pub mod result;
pub mod tickers;

pub use address::{Address, AddressRange};
pub use error::SyncError;
pub use job::{JobPreset, SyncJob};
pub use quote::{FieldFormat, FieldValue, KeyedQuotes, Lookup, QuoteBook, QuoteRecord};
pub use result::Result;
pub use tickers::{Ticker, TickerKind, TickerMap};
