//! Real-network fetcher on libcurl.
//!
//! One `Easy` handle per fetch: GET, follow redirects up to the hop bound,
//! per-fetch connect/total timeouts, body collected through the transfer
//! callback. curl errors are classified into the [`FetchFailure`] taxonomy
//! so ambiguity (timeout vs. confirmed difference) survives to the trace.

use std::time::Duration;

use super::{FetchFailure, FetchResult, Fetcher};

const USER_AGENT: &str = concat!("urlcanon/", env!("CARGO_PKG_VERSION"));

/// Classify a curl error into a fetch failure.
pub(crate) fn classify_curl_error(e: &curl::Error) -> FetchFailure {
    if e.is_operation_timedout() {
        return FetchFailure::Timeout;
    }
    if e.is_too_many_redirects() {
        return FetchFailure::TooManyRedirects;
    }
    FetchFailure::Network(e.to_string())
}

impl From<curl::Error> for FetchFailure {
    fn from(e: curl::Error) -> Self {
        classify_curl_error(&e)
    }
}

/// Default [`Fetcher`]: a fresh GET per call, nothing cached.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurlFetcher;

impl CurlFetcher {
    pub fn new() -> Self {
        CurlFetcher
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        max_redirects: u32,
    ) -> Result<FetchResult, FetchFailure> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.useragent(USER_AGENT)?;
        easy.follow_location(true)?;
        easy.max_redirections(max_redirects)?;
        easy.connect_timeout(timeout)?;
        easy.timeout(timeout)?;

        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        if status >= 400 {
            tracing::debug!(url, status, "fetch rejected by status");
            return Err(FetchFailure::Http(status));
        }
        let final_url = match easy.effective_url() {
            Ok(Some(u)) => u.to_string(),
            _ => url.to_string(),
        };
        tracing::debug!(url, status, bytes = body.len(), %final_url, "fetched");
        Ok(FetchResult {
            final_url,
            status,
            body,
        })
    }
}
