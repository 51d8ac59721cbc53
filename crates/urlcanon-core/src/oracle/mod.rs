//! Fetch-and-compare equivalence oracle.
//!
//! `check(a, b)` fetches both URLs fresh (concurrently, on a scoped helper
//! thread) and compares their signatures under the pinned strategy. The
//! oracle never errors out: every outcome is a [`Verdict`], and any fetch
//! failure yields [`Verdict::Unverified`] — fail closed, so a reduction is
//! only ever accepted on positive confirmation. Nothing is cached across
//! calls; content drift between calls is a documented precision limit.

use std::sync::Arc;
use std::time::Duration;

use crate::fetch::{FetchFailure, Fetcher};
use crate::signature::{self, Signature, SignatureStrategy};
use crate::url_model::Url;

/// Outcome of one equivalence check. `Different` and `Unverified` both
/// reject a reduction; they are kept distinct so the trace can tell
/// "confirmed different" from "could not confirm".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Equivalent,
    Different,
    Unverified(FetchFailure),
}

impl Verdict {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Verdict::Equivalent)
    }
}

pub struct EquivalenceOracle {
    fetcher: Arc<dyn Fetcher>,
    strategy: SignatureStrategy,
    timeout: Duration,
    max_redirects: u32,
}

impl EquivalenceOracle {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        strategy: SignatureStrategy,
        timeout: Duration,
        max_redirects: u32,
    ) -> Self {
        Self {
            fetcher,
            strategy,
            timeout,
            max_redirects,
        }
    }

    pub fn strategy(&self) -> SignatureStrategy {
        self.strategy
    }

    /// Do `a` and `b` currently serve the same content? Exactly two fetches,
    /// both fresh, run side by side.
    pub fn check(&self, a: &Url, b: &Url) -> Verdict {
        let url_a = a.render();
        let url_b = b.render();

        let fetcher = Arc::clone(&self.fetcher);
        let (timeout, hops) = (self.timeout, self.max_redirects);
        let (res_a, res_b) = std::thread::scope(|scope| {
            let handle = scope.spawn(|| fetcher.fetch(&url_b, timeout, hops));
            let res_a = self.fetcher.fetch(&url_a, timeout, hops);
            let res_b = handle.join().unwrap_or_else(|_| {
                Err(FetchFailure::Network("fetch worker panicked".to_string()))
            });
            (res_a, res_b)
        });

        let sig_a = signature::extract(&res_a, self.strategy);
        let sig_b = signature::extract(&res_b, self.strategy);
        if sig_a == sig_b {
            tracing::debug!(a = %url_a, b = %url_b, "oracle: equivalent");
            return Verdict::Equivalent;
        }
        // Sentinel signatures compare unequal, so surface the failure
        // instead of claiming a confirmed difference.
        if let Err(failure) = res_a {
            tracing::debug!(a = %url_a, b = %url_b, %failure, "oracle: unverified");
            return Verdict::Unverified(failure);
        }
        if let Err(failure) = res_b {
            tracing::debug!(a = %url_a, b = %url_b, %failure, "oracle: unverified");
            return Verdict::Unverified(failure);
        }
        tracing::debug!(a = %url_a, b = %url_b, "oracle: different");
        Verdict::Different
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;

    fn oracle_with(stub: StubFetcher, strategy: SignatureStrategy) -> EquivalenceOracle {
        EquivalenceOracle::new(Arc::new(stub), strategy, Duration::from_secs(1), 10)
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn matching_titles_are_equivalent() {
        let stub = StubFetcher::new();
        stub.ok("https://a.test/x", 200, "<title>Same</title>");
        stub.ok("https://a.test/y", 200, "<title>Same</title><p>extra</p>");
        let oracle = oracle_with(stub, SignatureStrategy::StatusTitle);
        assert_eq!(
            oracle.check(&url("https://a.test/x"), &url("https://a.test/y")),
            Verdict::Equivalent
        );
    }

    #[test]
    fn differing_titles_are_different() {
        let stub = StubFetcher::new();
        stub.ok("https://a.test/x", 200, "<title>One</title>");
        stub.ok("https://a.test/y", 200, "<title>Two</title>");
        let oracle = oracle_with(stub, SignatureStrategy::StatusTitle);
        assert_eq!(
            oracle.check(&url("https://a.test/x"), &url("https://a.test/y")),
            Verdict::Different
        );
    }

    #[test]
    fn one_failed_fetch_is_unverified_not_different() {
        let stub = StubFetcher::new();
        stub.ok("https://a.test/x", 200, "<title>T</title>");
        stub.fail("https://a.test/y", FetchFailure::Timeout);
        let oracle = oracle_with(stub, SignatureStrategy::StatusTitle);
        assert_eq!(
            oracle.check(&url("https://a.test/x"), &url("https://a.test/y")),
            Verdict::Unverified(FetchFailure::Timeout)
        );
    }

    #[test]
    fn both_failed_fetches_are_unverified() {
        // Two dead URLs must never be "equivalent by accident".
        let stub = StubFetcher::new();
        stub.fail_default(FetchFailure::Http(500));
        let oracle = oracle_with(stub, SignatureStrategy::StatusTitle);
        assert_eq!(
            oracle.check(&url("https://a.test/x"), &url("https://a.test/y")),
            Verdict::Unverified(FetchFailure::Http(500))
        );
    }

    #[test]
    fn two_fetches_per_call_no_caching() {
        let stub = Arc::new(StubFetcher::new());
        stub.ok_default(200, "<title>T</title>");
        let oracle = EquivalenceOracle::new(
            Arc::clone(&stub) as Arc<dyn Fetcher>,
            SignatureStrategy::StatusTitle,
            Duration::from_secs(1),
            10,
        );
        let a = url("https://a.test/x");
        oracle.check(&a, &a);
        oracle.check(&a, &a);
        assert_eq!(stub.calls(), 4);
    }
}
