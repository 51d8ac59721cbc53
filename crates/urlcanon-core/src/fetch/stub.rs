//! Scriptable in-memory fetcher for tests and offline dry runs.
//!
//! Routes are keyed by the exact rendered URL; unrouted URLs fall back to a
//! default response when one is set. Every call is counted so tests can
//! assert that a parse failure makes zero network calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{FetchFailure, FetchResult, Fetcher};

#[derive(Default)]
pub struct StubFetcher {
    routes: Mutex<HashMap<String, Result<FetchResult, FetchFailure>>>,
    fallback: Mutex<Option<Result<FetchResult, FetchFailure>>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `url` to a successful response with the given body.
    pub fn ok(&self, url: &str, status: u32, body: &str) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            Ok(FetchResult {
                final_url: url.to_string(),
                status,
                body: body.as_bytes().to_vec(),
            }),
        );
    }

    /// Route `url` to a fetch failure.
    pub fn fail(&self, url: &str, failure: FetchFailure) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(failure));
    }

    /// Response for any URL without an explicit route.
    pub fn ok_default(&self, status: u32, body: &str) {
        *self.fallback.lock().unwrap() = Some(Ok(FetchResult {
            final_url: String::new(),
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    /// Fail any URL without an explicit route.
    pub fn fail_default(&self, failure: FetchFailure) {
        *self.fallback.lock().unwrap() = Some(Err(failure));
    }

    /// Number of fetch() invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Fetcher for StubFetcher {
    fn fetch(
        &self,
        url: &str,
        _timeout: Duration,
        _max_redirects: u32,
    ) -> Result<FetchResult, FetchFailure> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(routed) = self.routes.lock().unwrap().get(url) {
            return fill_final_url(url, routed.clone());
        }
        match self.fallback.lock().unwrap().clone() {
            Some(res) => fill_final_url(url, res),
            None => Err(FetchFailure::Network(format!("no stub route for {url}"))),
        }
    }
}

fn fill_final_url(
    url: &str,
    res: Result<FetchResult, FetchFailure>,
) -> Result<FetchResult, FetchFailure> {
    res.map(|mut r| {
        if r.final_url.is_empty() {
            r.final_url = url.to_string();
        }
        r
    })
}
