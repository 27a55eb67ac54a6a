//! Quote records and the tolerant parser for quote endpoint responses.
//!
//! The endpoint answers with something that is usually JSON, but bodies can be
//! truncated or slightly malformed, so this is a scanner rather than a JSON
//! parser. Grammar, applied left to right:
//!
//! ```text
//! body    := junk '[' list ']' junk      (first '[' and the first ']' after it)
//! list    := (junk '{' group '}')*       (scan stops when no full group remains)
//! group   := element (',' element)*
//! element := key ':' value               (quotes removed, split on the first ':')
//! ```
//!
//! Only `symbol`, `regularMarketPrice` and `currency` are kept; the last
//! occurrence in a group wins. Elements without a `:` are skipped. A body with no
//! bracketed list yields an empty `QuoteBook`.
use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use strum_macros::Display;

use crate::tickers::{FX_SUFFIX, TickerMap};

const SYMBOL: &str = "symbol";
const PRICE: &str = "regularMarketPrice";
const CURRENCY: &str = "currency";

/// Pence sterling as reported by the endpoint, and the code the sheet uses.
const PENCE_REPORTED: &str = "GBp";
const PENCE: &str = "GBX";

static SENTINEL: Lazy<QuoteRecord> = Lazy::new(|| QuoteRecord::new("0", "n/a"));

/// How a record field should land in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FieldFormat {
    /// Written as a number when it parses as one.
    Numeric,
    /// Always written as a string.
    Text,
}

/// One record field together with its write format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    /// Field text exactly as parsed.
    pub text: String,
    /// Format used at write time.
    pub format: FieldFormat,
}

/// Price and currency for a single ticker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuoteRecord {
    /// Last regular market price, empty if the endpoint sent none.
    pub price: String,
    /// Currency code, empty if the endpoint sent none.
    pub currency: String,
}

impl QuoteRecord {
    /// Formats of the fields, by position.
    pub const FORMATS: [FieldFormat; 2] = [FieldFormat::Numeric, FieldFormat::Text];

    /// Create a record from its two fields.
    pub fn new(price: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            price: price.into(),
            currency: currency.into(),
        }
    }

    /// Record written for a classified key the endpoint returned nothing for.
    pub fn sentinel() -> &'static QuoteRecord {
        &SENTINEL
    }

    /// The `index`-th field with its format, `None` past the last field.
    pub fn field(&self, index: usize) -> Option<FieldValue> {
        let text = match index {
            0 => &self.price,
            1 => &self.currency,
            _ => return None,
        };
        Some(FieldValue {
            text: text.clone(),
            format: Self::FORMATS[index],
        })
    }
}

/// Ticker symbol to record map parsed from one response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteBook {
    records: HashMap<String, QuoteRecord>,
}

impl QuoteBook {
    /// Parse a response body, keeping whatever records can be recovered.
    pub fn parse(text: &str) -> Self {
        let mut book = QuoteBook::default();

        let Some(mut rest) = list_span(text) else {
            debug!("no bracketed list in response");
            return book;
        };

        while let Some((group, tail)) = next_group(rest) {
            rest = tail;
            let (symbol, record) = parse_group(group);
            if symbol.is_empty() {
                debug!("skipping group without symbol: {}", group);
                continue;
            }
            book.records.insert(symbol, record);
        }

        debug!("parsed {} quote records", book.records.len());
        book
    }

    /// Record filed under `symbol`.
    pub fn get(&self, symbol: &str) -> Option<&QuoteRecord> {
        self.records.get(symbol)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` if nothing was parsed.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, symbol: impl Into<String>, record: QuoteRecord) {
        self.records.insert(symbol.into(), record);
    }
}

/// Text between the first `[` and the first `]` after it.
fn list_span(text: &str) -> Option<&str> {
    let open = text.find('[')?;
    let rest = &text[open + 1..];
    let close = rest.find(']')?;
    Some(&rest[..close])
}

/// Next `{ ... }` group and the text after it.
fn next_group(text: &str) -> Option<(&str, &str)> {
    let open = text.find('{')?;
    let rest = &text[open + 1..];
    let close = rest.find('}')?;
    Some((&rest[..close], &rest[close + 1..]))
}

fn parse_group(group: &str) -> (String, QuoteRecord) {
    let mut symbol = String::new();
    let mut record = QuoteRecord::default();

    for element in group.split(',') {
        let element = element.replace('"', "");
        let Some((key, value)) = element.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            SYMBOL => symbol = value.to_string(),
            PRICE => record.price = value.to_string(),
            CURRENCY => record.currency = value.to_string(),
            _ => {}
        }
    }

    if let Some(pair) = symbol.strip_suffix(FX_SUFFIX) {
        symbol = pair.to_string();
    }
    if record.currency == PENCE_REPORTED {
        record.currency = PENCE.to_string();
    }

    (symbol, record)
}

/// Outcome of looking a raw key up through its ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// The endpoint returned a record for the key's ticker.
    Quoted(&'a QuoteRecord),
    /// The key was classified but no record came back.
    Defaulted,
}

impl<'a> Lookup<'a> {
    /// Record to write for this key.
    pub fn record(&self) -> &'a QuoteRecord {
        match *self {
            Lookup::Quoted(record) => record,
            Lookup::Defaulted => QuoteRecord::sentinel(),
        }
    }
}

/// Raw key to record view over a `TickerMap` and a `QuoteBook`.
#[derive(Debug, Clone, Copy)]
pub struct KeyedQuotes<'a> {
    tickers: &'a TickerMap,
    book: &'a QuoteBook,
}

impl<'a> KeyedQuotes<'a> {
    /// Join classification and parsed records.
    pub fn new(tickers: &'a TickerMap, book: &'a QuoteBook) -> Self {
        Self { tickers, book }
    }

    /// Look a raw key up; `None` if the key was never classified.
    pub fn get(&self, key: &str) -> Option<Lookup<'a>> {
        let ticker = self.tickers.get(key)?;
        Some(match self.book.get(ticker.lookup_symbol()) {
            Some(record) => Lookup::Quoted(record),
            None => Lookup::Defaulted,
        })
    }
}
