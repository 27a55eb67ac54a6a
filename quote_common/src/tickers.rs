//! Classification of raw sheet keys into quote endpoint tickers.
//!
//! A key is tested against an ordered list of market-identifier shapes and the
//! first matching rule decides the ticker:
//!
//! 1. `ExchangeEquity`: `BP.L`: 2-4 alphanumerics, a dot, then letters. Unchanged.
//! 2. `Equity`: `BP` or `BP.`: 2-4 alphanumerics, optional trailing dot (dropped).
//! 3. `Index`: `^FTSE`: a caret followed by alphanumerics. Unchanged.
//! 4. `FxPair`: `EURUSD` or `EURUSD=X`: six letters, always sent with `=X`.
//!
//! Keys matching none of the rules are left out of the `TickerMap` and are never
//! fetched or written.
use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use strum_macros::Display;

/// Suffix the endpoint uses for currency pairs.
pub const FX_SUFFIX: &str = "=X";

static EXCHANGE_EQUITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z0-9]{2,4}\.[A-Z]+)$").expect("valid exchange equity regex"));
static EQUITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z0-9]{2,4})\.?$").expect("valid equity regex"));
static INDEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\^[A-Z0-9]+)$").expect("valid index regex"));
static FX_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{6})(?:=X)?$").expect("valid fx pair regex"));

/// Shape of market identifier a key was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TickerKind {
    /// Exchange-qualified equity, e.g. `BP.L`.
    ExchangeEquity,
    /// Bare equity, e.g. `BP`.
    Equity,
    /// Market index, e.g. `^FTSE`.
    Index,
    /// Currency pair, e.g. `EURUSD=X`.
    FxPair,
}

impl TickerKind {
    /// Rules in the order they are tried.
    pub const PRIORITY: [TickerKind; 4] = [
        TickerKind::ExchangeEquity,
        TickerKind::Equity,
        TickerKind::Index,
        TickerKind::FxPair,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            TickerKind::ExchangeEquity => &EXCHANGE_EQUITY,
            TickerKind::Equity => &EQUITY,
            TickerKind::Index => &INDEX,
            TickerKind::FxPair => &FX_PAIR,
        }
    }

    /// Apply this rule alone, returning the normalised symbol on a match.
    pub fn normalize(self, key: &str) -> Option<String> {
        let captures = self.pattern().captures(key)?;
        let symbol = captures.get(1)?.as_str();
        match self {
            TickerKind::FxPair => Some(format!("{}{}", symbol, FX_SUFFIX)),
            _ => Some(symbol.to_string()),
        }
    }
}

/// A normalised symbol sent to the quote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker {
    /// Rule that produced the symbol.
    pub kind: TickerKind,
    /// Symbol as sent on the wire.
    pub symbol: String,
}

impl Ticker {
    /// Classify a single key; `None` when no rule matches.
    pub fn classify(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        TickerKind::PRIORITY.iter().find_map(|kind| {
            kind.normalize(key).map(|symbol| Ticker {
                kind: *kind,
                symbol,
            })
        })
    }

    /// Symbol under which the endpoint's answer is filed after parsing.
    ///
    /// Currency pairs come back without their `=X` suffix.
    pub fn lookup_symbol(&self) -> &str {
        self.symbol
            .strip_suffix(FX_SUFFIX)
            .unwrap_or(self.symbol.as_str())
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Raw key to ticker mapping for one column of keys.
#[derive(Debug, Clone, Default)]
pub struct TickerMap {
    by_key: HashMap<String, Ticker>,
    symbols: Vec<String>,
}

impl TickerMap {
    /// Classify every key, keeping only the ones a rule matched.
    ///
    /// Several keys may share a ticker; `symbols` lists each ticker once, in the
    /// order it was first seen.
    pub fn classify<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = TickerMap::default();
        let mut seen = HashSet::new();

        for key in keys {
            if map.by_key.contains_key(key) {
                continue;
            }
            let Some(ticker) = Ticker::classify(key) else {
                continue;
            };
            debug!("{}: {} => {}", ticker.kind, key, ticker.symbol);
            if seen.insert(ticker.symbol.clone()) {
                map.symbols.push(ticker.symbol.clone());
            }
            map.by_key.insert(key.to_string(), ticker);
        }
        map
    }

    /// Ticker for a raw key, if it was classified.
    pub fn get(&self, key: &str) -> Option<&Ticker> {
        self.by_key.get(key)
    }

    /// Whether the raw key was classified.
    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Unique ticker symbols to request.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Number of classified keys.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// `true` if no key was classified.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
