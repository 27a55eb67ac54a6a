//! Retrying HTTP GET for the quote endpoint.
//!
//! A fetch walks a small state machine:
//!
//! ```text
//! Idle -> Attempting(timeout) -> success -> Done
//!                             -> failure -> Attempting(timeout * 2)   while attempts < max
//!                                        -> Failed                    otherwise
//! ```
//!
//! Transport errors, timeouts and non-success statuses all count as a failed
//! attempt. Each attempt has its own timeout; there is no overall deadline.
//! Bodies are decoded as Windows-1252 (see `quote_common::net::decode_legacy`).
use std::time::Duration;

use log::{info, warn};
use quote_common::net::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECS, QUOTE_URL_BASE, decode_legacy,
};
use quote_common::{Result, SyncError};
use reqwest::blocking::Client;

/// Default `User-Agent` header; the endpoint rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) quote_sync/0.1";

/// One blocking GET with a per-request timeout.
pub trait Transport {
    /// Fetch `url`, returning the raw body of a successful response.
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>>;
}

/// `Transport` over a blocking `reqwest` client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build the HTTP client.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Build the HTTP client with the `User-Agent` of `config`.
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        Self::new(&config.user_agent)
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Transport(format!("HTTP status {}", status)));
        }

        let body = response
            .bytes()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Endpoint and retry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// URL prefix the `symbols=` parameter is appended to.
    pub base_url: String,
    /// Timeout of the first attempt; doubled after each failure.
    pub timeout: Duration,
    /// Attempts before giving up (at least one is always made).
    pub max_attempts: u32,
    /// `User-Agent` header.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: QUOTE_URL_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Terminal state of a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// An attempt succeeded.
    Done {
        /// Decoded response body.
        body: String,
        /// Attempts made, including the successful one.
        attempts: u32,
    },
    /// Every attempt failed; there is no body.
    Failed {
        /// Attempts made.
        attempts: u32,
    },
}

impl FetchOutcome {
    /// `true` for `Done`.
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchOutcome::Done { .. })
    }

    /// Body of a successful fetch.
    pub fn body(&self) -> Option<&str> {
        match self {
            FetchOutcome::Done { body, .. } => Some(body.as_str()),
            FetchOutcome::Failed { .. } => None,
        }
    }

    /// Body of a successful fetch, or `FetchFailed(url)`.
    pub fn into_body(self, url: &str) -> Result<String> {
        match self {
            FetchOutcome::Done { body, .. } => Ok(body),
            FetchOutcome::Failed { .. } => Err(SyncError::FetchFailed(url.to_string())),
        }
    }
}

enum State {
    Idle,
    Attempting { attempt: u32, timeout: Duration },
    Finished(FetchOutcome),
}

/// Retrying fetch client.
pub struct QuoteFetcher<T: Transport> {
    transport: T,
    base_url: String,
    timeout: Duration,
    max_attempts: u32,
}

impl<T: Transport> QuoteFetcher<T> {
    /// Wrap a transport with the retry settings of `config`.
    pub fn new(transport: T, config: &FetchConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// URL prefix requests are built from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `url`, retrying with a doubled timeout until an attempt succeeds or
    /// the attempts run out.
    pub fn fetch(&self, url: &str) -> FetchOutcome {
        let mut state = State::Idle;

        loop {
            state = match state {
                State::Idle => State::Attempting {
                    attempt: 1,
                    timeout: self.timeout,
                },
                State::Attempting { attempt, timeout } => {
                    info!(
                        "fetch attempt {}/{} (timeout {}s): {}",
                        attempt,
                        self.max_attempts,
                        timeout.as_secs_f64(),
                        url
                    );
                    match self.transport.get(url, timeout) {
                        Ok(bytes) => State::Finished(FetchOutcome::Done {
                            body: decode_legacy(&bytes),
                            attempts: attempt,
                        }),
                        Err(e) if attempt < self.max_attempts => {
                            warn!("fetch attempt {} failed: {}. Retrying", attempt, e);
                            State::Attempting {
                                attempt: attempt + 1,
                                timeout: timeout.saturating_mul(2),
                            }
                        }
                        Err(e) => {
                            warn!("fetch attempt {} failed: {}. Giving up", attempt, e);
                            State::Finished(FetchOutcome::Failed { attempts: attempt })
                        }
                    }
                }
                State::Finished(outcome) => return outcome,
            };
        }
    }
}
