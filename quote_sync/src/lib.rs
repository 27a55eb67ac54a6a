//! Quote sync: fetches market quotes and writes them next to their keys in a sheet.
//!
//! - `grid`: the cell store interface and an in-memory, CSV-backed implementation.
//! - `frame`: masked column batch read/clear/write (`DataFrame`, `DataSheet`).
//! - `fetcher`: retrying HTTP GET with a doubling per-attempt timeout.
//! - `sync`: the read, classify, fetch, parse, clear, write sequence of one job.
#![warn(missing_docs)]
pub mod fetcher;
pub mod frame;
pub mod grid;
pub mod sync;

pub use fetcher::{FetchConfig, FetchOutcome, HttpTransport, QuoteFetcher, Transport};
pub use frame::{DataColumn, DataFrame, DataSheet};
pub use grid::{Cell, Grid, MemoryGrid};
pub use sync::{QuoteSync, SyncReport};
