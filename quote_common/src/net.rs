//! Quote endpoint wire helpers shared by the sync client and its tests.

/// Default quote endpoint; the ticker list is appended as `symbols=`.
pub const QUOTE_URL_BASE: &str = "https://query1.finance.yahoo.com/v7/finance/quote?";

/// Per-attempt timeout of the first fetch attempt, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Number of fetch attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Windows-1252 code points for bytes 0x80..=0x9F; `None` marks undefined bytes.
#[rustfmt::skip]
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// Build the request URL for a list of ticker symbols.
pub fn build_url(base: &str, symbols: &[String]) -> String {
    format!("{}symbols={}", base, symbols.join(","))
}

/// Decode a response body as Windows-1252, dropping bytes the code page leaves
/// undefined.
pub fn decode_legacy(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter_map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            _ => Some(b as char),
        })
        .collect()
}
