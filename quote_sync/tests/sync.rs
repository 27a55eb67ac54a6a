use std::cell::RefCell;
use std::time::Duration;

use quote_common::{JobPreset, Result, SyncError, SyncJob};
use quote_sync::{
    Cell, FetchConfig, Grid, MemoryGrid, QuoteFetcher, QuoteSync, SyncReport, Transport,
};

const SHEET: &str = "Sheet1";
const BASE_URL: &str = "http://quotes.test/v7/finance/quote?";

const PRICES_BODY: &str = r#"{"quoteResponse":{"result":[
{"currency":"GBp","regularMarketPrice":452.35,"symbol":"BP.L"},
{"currency":"USD","regularMarketPrice":189.5,"symbol":"AAPL"}],"error":null}}"#;

const FX_BODY: &str = r#"{"quoteResponse":{"result":[{"currency":"USD","regularMarketPrice":1.0842,"symbol":"EURUSD=X"},{"currency":"JPY","regularMarketPrice":151.2,"symbol":"USDJPY=X"}]}}"#;

/// Answers every request with `failures` errors followed by `body`, recording the URLs.
struct FakeEndpoint {
    body: String,
    failures: RefCell<usize>,
    urls: RefCell<Vec<String>>,
}

impl FakeEndpoint {
    fn new(body: &str) -> Self {
        Self::failing(0, body)
    }

    fn failing(failures: usize, body: &str) -> Self {
        Self {
            body: body.to_string(),
            failures: RefCell::new(failures),
            urls: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for FakeEndpoint {
    fn get(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>> {
        self.urls.borrow_mut().push(url.to_string());
        let mut failures = self.failures.borrow_mut();
        if *failures > 0 {
            *failures -= 1;
            return Err(SyncError::Transport("connection reset".into()));
        }
        Ok(self.body.as_bytes().to_vec())
    }
}

fn sync_with(endpoint: FakeEndpoint) -> QuoteSync<FakeEndpoint> {
    let config = FetchConfig {
        base_url: BASE_URL.to_string(),
        ..FetchConfig::default()
    };
    QuoteSync::new(QuoteFetcher::new(endpoint, &config))
}

fn prices_sheet() -> MemoryGrid {
    let csv = "\
Ticker,Price,Currency
BP.L,1,old
,keep,keep
XYZ123,keep,keep
AAPL.,2,old
VOD.L,3,old
";
    let mut grid = MemoryGrid::new();
    grid.load_csv(SHEET, csv.as_bytes()).unwrap();
    grid
}

fn text(s: &str) -> Option<Cell> {
    Some(Cell::Text(s.to_string()))
}

fn cell(grid: &MemoryGrid, name: &str) -> Option<Cell> {
    let addr = quote_common::Address::parse(name).unwrap();
    grid.cell(SHEET, addr.column, addr.row).cloned()
}

#[test]
fn prices_job_writes_only_classified_rows() {
    let mut grid = prices_sheet();
    let sync = sync_with(FakeEndpoint::new(PRICES_BODY));

    let report = sync
        .run(&mut grid, SHEET, &SyncJob::new("A2:A7", &["B", "C"]))
        .unwrap();

    assert_eq!(
        report,
        SyncReport {
            rows: 6,
            masked: 3,
            quoted: 2,
            defaulted: 1
        }
    );
    assert_eq!(cell(&grid, "B2"), Some(Cell::Number(452.35)));
    assert_eq!(cell(&grid, "C2"), text("GBX"));
    assert_eq!(cell(&grid, "B3"), text("keep"));
    assert_eq!(cell(&grid, "B4"), text("keep"));
    assert_eq!(cell(&grid, "C4"), text("keep"));
    assert_eq!(cell(&grid, "B5"), Some(Cell::Number(189.5)));
    assert_eq!(cell(&grid, "C5"), text("USD"));
    assert_eq!(cell(&grid, "B6"), Some(Cell::Number(0.0)));
    assert_eq!(cell(&grid, "C6"), text("n/a"));
    assert_eq!(cell(&grid, "B7"), None);

    let urls = sync.fetcher().transport().urls.borrow();
    assert_eq!(urls.as_slice(), &[format!("{}symbols=BP.L,AAPL,VOD.L", BASE_URL)]);
}

#[test]
fn fx_preset_fills_both_column_pairs() {
    let mut grid = MemoryGrid::with_sheet(SHEET);
    grid.write_cell_string(SHEET, 6, 1, "EURUSD").unwrap();
    grid.write_cell_string(SHEET, 6, 2, "GBPUSD=X").unwrap();
    grid.write_cell_string(SHEET, 9, 1, "USDJPY=X").unwrap();
    let sync = sync_with(FakeEndpoint::new(FX_BODY));

    let reports = sync.run_all(&mut grid, SHEET, &JobPreset::Fx.jobs()).unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(cell(&grid, "H2"), Some(Cell::Number(1.0842)));
    assert_eq!(cell(&grid, "H3"), Some(Cell::Number(0.0)));
    assert_eq!(cell(&grid, "I2"), Some(Cell::Number(151.2)));
    assert_eq!(cell(&grid, "I3"), None);

    let urls = sync.fetcher().transport().urls.borrow();
    assert_eq!(urls[0], format!("{}symbols=EURUSD=X,GBPUSD=X", BASE_URL));
    assert_eq!(urls[1], format!("{}symbols=USDJPY=X", BASE_URL));
}

#[test]
fn failed_fetch_leaves_grid_untouched() {
    let mut grid = prices_sheet();
    let before = grid.clone();
    let sync = sync_with(FakeEndpoint::failing(5, PRICES_BODY));

    let result = sync.run(&mut grid, SHEET, &SyncJob::new("A2:A7", &["B", "C"]));

    match result {
        Err(SyncError::FetchFailed(url)) => assert!(url.starts_with(BASE_URL)),
        other => panic!("expected FetchFailed, got {:?}", other),
    }
    assert_eq!(grid, before);
    assert_eq!(sync.fetcher().transport().urls.borrow().len(), 5);
}

#[test]
fn transient_failures_are_retried() {
    let mut grid = prices_sheet();
    let sync = sync_with(FakeEndpoint::failing(3, PRICES_BODY));

    let report = sync
        .run(&mut grid, SHEET, &SyncJob::new("A2:A7", &["B", "C"]))
        .unwrap();

    assert_eq!(report.quoted, 2);
    assert_eq!(sync.fetcher().transport().urls.borrow().len(), 4);
}

#[test]
fn sync_is_idempotent() {
    let mut grid = prices_sheet();
    let sync = sync_with(FakeEndpoint::new(PRICES_BODY));
    let job = SyncJob::new("A2:A7", &["B", "C"]);

    sync.run(&mut grid, SHEET, &job).unwrap();
    let first = grid.clone();
    sync.run(&mut grid, SHEET, &job).unwrap();

    assert_eq!(grid, first);
}

#[test]
fn empty_response_blanks_then_defaults_classified_rows() {
    let mut grid = prices_sheet();
    let sync = sync_with(FakeEndpoint::new("<html>rate limited</html>"));

    let report = sync
        .run(&mut grid, SHEET, &SyncJob::new("A2:A7", &["B", "C"]))
        .unwrap();

    assert_eq!(report.defaulted, 3);
    assert_eq!(cell(&grid, "B2"), Some(Cell::Number(0.0)));
    assert_eq!(cell(&grid, "C2"), text("n/a"));
    assert_eq!(cell(&grid, "B3"), text("keep"));
}

#[test]
fn no_classifiable_keys_skips_fetch() {
    let mut grid = MemoryGrid::with_sheet(SHEET);
    grid.write_cell_string(SHEET, 0, 1, "Total").unwrap();
    let sync = sync_with(FakeEndpoint::failing(5, ""));

    let report = sync
        .run(&mut grid, SHEET, &SyncJob::new("A2:A5", &["B"]))
        .unwrap();

    assert_eq!(report.masked, 0);
    assert!(sync.fetcher().transport().urls.borrow().is_empty());
}

#[test]
fn unknown_sheet_is_reported() {
    let mut grid = prices_sheet();
    let sync = sync_with(FakeEndpoint::new(PRICES_BODY));

    let result = sync.run(&mut grid, "Prices", &SyncJob::new("A2:A7", &["B"]));
    assert!(matches!(result, Err(SyncError::UnknownSheet(name)) if name == "Prices"));
}
