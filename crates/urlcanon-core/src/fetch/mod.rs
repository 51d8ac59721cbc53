//! Network retrieval behind a trait seam.
//!
//! The oracle and reducer only ever see [`Fetcher`]; the libcurl
//! implementation lives in [`http`], and tests inject the scriptable
//! [`stub::StubFetcher`]. A fetcher follows redirects up to the hop bound,
//! does no retries (each reduction step already issues fresh fetches), and
//! reports timeout, redirect-loop, HTTP and network failures distinctly so
//! the oracle can fail closed with a reason.

pub mod expand;
pub mod http;
pub mod stub;

use std::time::Duration;

use thiserror::Error;

/// A completed retrieval after following redirects.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL the redirect chain landed on.
    pub final_url: String,
    /// HTTP status of the final response.
    pub status: u32,
    /// Response body bytes.
    pub body: Vec<u8>,
}

/// Why a retrieval produced no comparable content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Transfer exceeded the per-fetch timeout.
    #[error("timeout")]
    Timeout,
    /// Redirect chain exceeded the hop limit.
    #[error("too many redirects")]
    TooManyRedirects,
    /// Final response had an error status (>= 400).
    #[error("HTTP {0}")]
    Http(u32),
    /// Connection, DNS or protocol-level failure.
    #[error("network: {0}")]
    Network(String),
}

/// Single-operation retrieval capability. Implementations must be shareable
/// across the worker threads of the parallel query stage.
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, following at most `max_redirects` hops, giving up after
    /// `timeout`.
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        max_redirects: u32,
    ) -> Result<FetchResult, FetchFailure>;
}
