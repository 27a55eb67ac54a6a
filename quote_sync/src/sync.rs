//! One sync: read keys, classify, fetch, parse, clear, write.
//!
//! The grid is only modified after a fetch has succeeded; a failed fetch
//! surfaces `FetchFailed` with nothing cleared or written.
use std::fmt;

use log::{debug, info};
use quote_common::net::build_url;
use quote_common::{KeyedQuotes, QuoteBook, Result, SyncJob, TickerMap};

use crate::fetcher::{QuoteFetcher, Transport};
use crate::frame::{DataFrame, DataSheet};
use crate::grid::Grid;

/// Summary of one sync job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Rows in the key range.
    pub rows: usize,
    /// Rows whose key classified into a ticker.
    pub masked: usize,
    /// Masked rows written from a returned quote.
    pub quoted: usize,
    /// Masked rows written with the sentinel record.
    pub defaulted: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows={} masked={} quoted={} defaulted={}",
            self.rows, self.masked, self.quoted, self.defaulted
        )
    }
}

/// Runs sync jobs against a grid using a fetch client.
pub struct QuoteSync<T: Transport> {
    fetcher: QuoteFetcher<T>,
}

impl<T: Transport> QuoteSync<T> {
    /// Sync through `fetcher`, using its endpoint URL prefix.
    pub fn new(fetcher: QuoteFetcher<T>) -> Self {
        Self { fetcher }
    }

    /// The fetch client.
    pub fn fetcher(&self) -> &QuoteFetcher<T> {
        &self.fetcher
    }

    /// Run one job on `sheet`.
    pub fn run<G: Grid + ?Sized>(
        &self,
        grid: &mut G,
        sheet: &str,
        job: &SyncJob,
    ) -> Result<SyncReport> {
        let key_range = job.key_range()?;
        let destinations = job.destination_columns()?;
        debug!("keycolumn: {}  datacols: {:?}", key_range, job.columns);

        let mut data_sheet = DataSheet::new(grid, sheet);
        let keys = data_sheet.read_column(&key_range, false)?;
        let tickers = TickerMap::classify(keys.values().iter().map(String::as_str));
        let mut frame = DataFrame::new(keys, &tickers, &destinations);

        let mut report = SyncReport {
            rows: frame.keys().len(),
            masked: frame.masked_rows(),
            ..SyncReport::default()
        };

        if tickers.is_empty() {
            info!("no classifiable keys in {}!{}, nothing to fetch", sheet, key_range);
            return Ok(report);
        }

        let url = build_url(self.fetcher.base_url(), tickers.symbols());
        debug!("url: {}", url);
        let body = self.fetcher.fetch(&url).into_body(&url)?;

        let book = QuoteBook::parse(&body);
        let stats = frame.update(&KeyedQuotes::new(&tickers, &book));
        report.quoted = stats.quoted;
        report.defaulted = stats.defaulted;

        data_sheet.clear_frame(&frame)?;
        data_sheet.write_frame(&frame)?;

        info!("synced {}!{}: {}", sheet, key_range, report);
        Ok(report)
    }

    /// Run jobs in order, stopping at the first failure.
    pub fn run_all<G: Grid + ?Sized>(
        &self,
        grid: &mut G,
        sheet: &str,
        jobs: &[SyncJob],
    ) -> Result<Vec<SyncReport>> {
        jobs.iter().map(|job| self.run(grid, sheet, job)).collect()
    }
}
