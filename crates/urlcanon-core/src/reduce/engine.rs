//! The staged greedy reduction algorithm.
//!
//! Stage order: normalize (once, unverified), drop fragment, drop trailing
//! slash, strip path tail outermost-in until the first rejection, then try
//! each query key. Every candidate is judged against the frozen normalized
//! original; accepted reductions fold into the working URL, rejections are
//! rolled back by construction (the candidate is simply dropped). A failed
//! oracle check rejects that one candidate and the run continues; only a
//! parse error aborts, before any fetch happens.

use std::sync::Arc;

use crate::config::{CanonConfig, QueryScope};
use crate::fetch::Fetcher;
use crate::oracle::EquivalenceOracle;
use crate::url_model::{ParseError, Url};

use super::parallel;
use super::{CanonicalResult, CanonicalizationTrace, ReductionStep, TraceEntry};

/// Canonicalize `raw`: parse, normalize, then greedily reduce under the
/// oracle built from `fetcher` and `cfg`. The single public entry point.
pub fn canonicalize(
    raw: &str,
    fetcher: Arc<dyn Fetcher>,
    cfg: &CanonConfig,
) -> Result<CanonicalResult, ParseError> {
    let input = Url::parse(raw)?;
    let original = input.normalize();
    tracing::info!(input = raw, normalized = %original, strategy = %cfg.signature_strategy, "canonicalizing");
    let oracle = EquivalenceOracle::new(
        fetcher,
        cfg.signature_strategy,
        cfg.fetch_timeout(),
        cfg.redirect_hop_limit,
    );
    Ok(reduce(&oracle, original, cfg))
}

fn reduce(oracle: &EquivalenceOracle, original: Url, cfg: &CanonConfig) -> CanonicalResult {
    let mut working = original.clone();
    let mut trace: CanonicalizationTrace = Vec::new();

    if working.fragment().is_some() {
        attempt(
            oracle,
            &original,
            &mut working,
            ReductionStep::DropFragment,
            &mut trace,
        );
    }

    if working.has_trailing_slash() && !working.path_is_root() {
        attempt(
            oracle,
            &original,
            &mut working,
            ReductionStep::DropTrailingSlash,
            &mut trace,
        );
    }

    // Path segments are hierarchically significant: outermost-in, stopping
    // at the first rejection. O(segments) oracle calls, not O(2^segments).
    while !working.path_segments().is_empty() {
        let accepted = attempt(
            oracle,
            &original,
            &mut working,
            ReductionStep::DropPathTail,
            &mut trace,
        );
        if !accepted {
            break;
        }
    }

    let keys = eligible_keys(&working, cfg);
    if cfg.parallel_query_checks && !keys.is_empty() {
        // Each key is judged in isolation against the frozen original, then
        // the accepted removals are committed as a set.
        let decisions =
            parallel::check_keys(oracle, &original, &working, &keys, cfg.query_concurrency);
        for (step, candidate, verdict) in decisions {
            let accepted = verdict.is_equivalent();
            trace.push(TraceEntry {
                step: step.clone(),
                candidate: candidate.render(),
                outcome: verdict.into(),
            });
            if accepted {
                working = step.apply(&working);
            }
        }
    } else {
        // Sequential form: prior accepted removals compound into each
        // candidate; the comparison baseline stays the frozen original.
        for key in keys {
            attempt(
                oracle,
                &original,
                &mut working,
                ReductionStep::DropQueryParam { key },
                &mut trace,
            );
        }
    }

    let canonical_url = working.render();
    tracing::info!(%canonical_url, steps = trace.len(), "canonicalization finished");
    CanonicalResult {
        canonical_url,
        trace,
    }
}

/// Test one candidate against the frozen original and commit it on a
/// confirmed-equivalent verdict. Returns whether the step was accepted.
fn attempt(
    oracle: &EquivalenceOracle,
    original: &Url,
    working: &mut Url,
    step: ReductionStep,
    trace: &mut CanonicalizationTrace,
) -> bool {
    let candidate = step.apply(working);
    let verdict = oracle.check(original, &candidate);
    let accepted = verdict.is_equivalent();
    tracing::debug!(step = %step.name(), candidate = %candidate, accepted, "reduction step");
    trace.push(TraceEntry {
        step,
        candidate: candidate.render(),
        outcome: verdict.into(),
    });
    if accepted {
        *working = candidate;
    }
    accepted
}

fn eligible_keys(url: &Url, cfg: &CanonConfig) -> Vec<String> {
    let keys = url.query_keys();
    match cfg.query_scope {
        QueryScope::All => keys,
        QueryScope::TrackingOnly => keys
            .into_iter()
            .filter(|k| cfg.is_tracking_param(k))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;
    use crate::reduce::StepOutcome;

    const SAME: &str = "<title>same</title>";
    const OTHER: &str = "<title>other</title>";

    fn run(stub: StubFetcher, cfg: &CanonConfig, raw: &str) -> CanonicalResult {
        canonicalize(raw, Arc::new(stub), cfg).unwrap()
    }

    fn step_names(result: &CanonicalResult) -> Vec<String> {
        result.trace.iter().map(|e| e.step.name()).collect()
    }

    #[test]
    fn path_tail_stops_at_first_rejection() {
        let stub = StubFetcher::new();
        stub.ok_default(200, SAME);
        stub.ok("https://t.test/a", 200, OTHER);
        let result = run(stub, &CanonConfig::default(), "https://t.test/a/b/c");

        assert_eq!(result.canonical_url, "https://t.test/a/b");
        assert_eq!(
            step_names(&result),
            ["drop-path-tail", "drop-path-tail"],
            "no candidate below the first rejection is tried"
        );
        assert!(result.trace[0].outcome.accepted());
        assert!(!result.trace[1].outcome.accepted());
    }

    #[test]
    fn fragment_and_slash_stages_precede_path_stage() {
        let stub = StubFetcher::new();
        stub.ok_default(200, SAME);
        stub.ok("https://t.test", 200, OTHER);
        let result = run(stub, &CanonConfig::default(), "https://t.test/a/#sec");

        assert_eq!(result.canonical_url, "https://t.test/a");
        assert_eq!(
            step_names(&result),
            ["drop-fragment", "drop-trailing-slash", "drop-path-tail"]
        );
    }

    #[test]
    fn root_slash_is_never_proposed() {
        let stub = StubFetcher::new();
        stub.ok_default(200, SAME);
        let result = run(stub, &CanonConfig::default(), "https://t.test/");
        assert_eq!(result.canonical_url, "https://t.test/");
        assert!(result.trace.is_empty(), "nothing to reduce on the root");
    }

    #[test]
    fn unverified_candidate_is_rejected_and_run_continues() {
        let stub = StubFetcher::new();
        stub.ok_default(200, SAME);
        // Fragment candidate cannot be fetched; slash candidate can.
        stub.fail(
            "https://t.test/a/",
            crate::fetch::FetchFailure::Timeout,
        );
        stub.ok("https://t.test#x", 200, OTHER);
        let result = run(stub, &CanonConfig::default(), "https://t.test/a/#x");

        // The fragment survives (could not confirm), the slash goes.
        assert_eq!(result.canonical_url, "https://t.test/a#x");
        assert_eq!(
            step_names(&result),
            ["drop-fragment", "drop-trailing-slash", "drop-path-tail"]
        );
        assert_eq!(
            result.trace[0].outcome,
            StepOutcome::RejectedUnverified("timeout".to_string())
        );
        assert!(result.trace[1].outcome.accepted());
        assert!(!result.trace[2].outcome.accepted());
    }

    #[test]
    fn tracking_only_scope_skips_unknown_keys() {
        let stub = StubFetcher::new();
        stub.ok_default(200, SAME);
        stub.ok("https://t.test?utm_source=x&id=5", 200, OTHER);
        let cfg = CanonConfig {
            query_scope: QueryScope::TrackingOnly,
            ..CanonConfig::default()
        };
        let result = run(stub, &cfg, "https://t.test/p?utm_source=x&id=5");

        assert_eq!(result.canonical_url, "https://t.test/p?id=5");
        assert_eq!(
            step_names(&result),
            ["drop-path-tail", "drop-query-param:utm_source"],
            "id is never attempted under tracking-only scope"
        );
    }

    #[test]
    fn parallel_and_sequential_agree_on_independent_verdicts() {
        let routes_different = [
            // Any candidate missing b=2 is a different page, and so is the
            // path-tail candidate (rendered without a path).
            "https://t.test/p?c=3",
            "https://t.test/p?a=1&c=3",
            "https://t.test?a=1&b=2&c=3",
        ];
        let make_stub = || {
            let stub = StubFetcher::new();
            stub.ok_default(200, SAME);
            for url in routes_different {
                stub.ok(url, 200, OTHER);
            }
            stub
        };

        let sequential = run(
            make_stub(),
            &CanonConfig::default(),
            "https://t.test/p?a=1&b=2&c=3",
        );
        let parallel = run(
            make_stub(),
            &CanonConfig {
                parallel_query_checks: true,
                query_concurrency: 3,
                ..CanonConfig::default()
            },
            "https://t.test/p?a=1&b=2&c=3",
        );

        assert_eq!(sequential.canonical_url, "https://t.test/p?b=2");
        assert_eq!(parallel.canonical_url, sequential.canonical_url);

        let accepted = |r: &CanonicalResult| -> Vec<String> {
            r.accepted_steps().map(|e| e.step.name()).collect()
        };
        assert_eq!(accepted(&sequential), accepted(&parallel));
    }

    #[test]
    fn no_query_keys_means_no_query_stage() {
        let stub = StubFetcher::new();
        stub.ok_default(200, SAME);
        let result = run(stub, &CanonConfig::default(), "https://t.test/p");
        // Only the path stage runs.
        assert!(step_names(&result)
            .iter()
            .all(|name| name == "drop-path-tail"));
    }
}
