//! End-to-end canonicalization against the scriptable stub fetcher:
//! the named scenarios plus the idempotence, fail-closed and
//! order-independence properties.

use std::sync::Arc;
use std::time::Duration;

use urlcanon_core::config::CanonConfig;
use urlcanon_core::fetch::stub::StubFetcher;
use urlcanon_core::fetch::FetchFailure;
use urlcanon_core::oracle::{EquivalenceOracle, Verdict};
use urlcanon_core::reduce::CanonicalResult;
use urlcanon_core::url_model::{ParseError, Url};
use urlcanon_core::canonicalize;

const SAME: &str = "<title>same page</title>";
const OTHER: &str = "<title>different page</title>";

fn canon(stub: &Arc<StubFetcher>, raw: &str) -> CanonicalResult {
    canonicalize(raw, Arc::clone(stub) as Arc<dyn urlcanon_core::fetch::Fetcher>, &CanonConfig::default()).unwrap()
}

fn accepted_names(result: &CanonicalResult) -> Vec<String> {
    result.accepted_steps().map(|e| e.step.name()).collect()
}

#[test]
fn scenario_a_tracking_param_and_fragment_go_id_stays() {
    let stub = Arc::new(StubFetcher::new());
    stub.ok_default(200, SAME);
    stub.ok("https://example.com?utm_source=x&id=5", 200, OTHER);
    stub.ok("https://example.com/path", 200, OTHER);

    let result = canon(&stub, "https://example.com/path/?utm_source=x&id=5#frag");

    assert_eq!(result.canonical_url, "https://example.com/path?id=5");
    assert_eq!(
        accepted_names(&result),
        [
            "drop-fragment",
            "drop-trailing-slash",
            "drop-query-param:utm_source"
        ]
    );
}

#[test]
fn scenario_b_trailing_slash_dropped_when_equivalent() {
    let stub = Arc::new(StubFetcher::new());
    stub.ok_default(200, SAME);
    stub.ok("https://example.com", 200, OTHER);

    let result = canon(&stub, "https://example.com/a/");

    assert_eq!(result.canonical_url, "https://example.com/a");
}

#[test]
fn scenario_c_parse_error_makes_zero_fetches() {
    let stub = Arc::new(StubFetcher::new());
    stub.ok_default(200, SAME);

    let err = canonicalize(
        "https://example.com/%00bad",
        Arc::clone(&stub) as Arc<dyn urlcanon_core::fetch::Fetcher>,
        &CanonConfig::default(),
    )
    .unwrap_err();

    assert_eq!(err, ParseError::EscapedNul);
    assert_eq!(stub.calls(), 0, "no oracle call before a successful parse");
}

#[test]
fn scenario_d_all_query_params_rejected_query_unchanged() {
    let stub = Arc::new(StubFetcher::new());
    stub.ok_default(200, SAME);
    stub.ok("https://example.com?a=1&b=2", 200, OTHER);
    stub.ok("https://example.com/p?b=2", 200, OTHER);
    stub.ok("https://example.com/p?a=1", 200, OTHER);

    let result = canon(&stub, "https://example.com/p?a=1&b=2");

    assert_eq!(result.canonical_url, "https://example.com/p?a=1&b=2");
    assert!(accepted_names(&result).is_empty());
}

#[test]
fn idempotence_on_own_output() {
    let stub = Arc::new(StubFetcher::new());
    stub.ok_default(200, SAME);
    stub.ok("https://example.com?utm_source=x&id=5", 200, OTHER);
    stub.ok("https://example.com/path", 200, OTHER);
    stub.ok("https://example.com?id=5", 200, OTHER);

    let first = canon(&stub, "https://example.com/path/?utm_source=x&id=5#frag");
    let second = canon(&stub, &first.canonical_url);

    assert_eq!(second.canonical_url, first.canonical_url);
    assert!(
        accepted_names(&second).is_empty(),
        "a second run must change nothing"
    );
}

#[test]
fn fail_closed_fully_unfetchable_yields_unreduced_input() {
    let stub = Arc::new(StubFetcher::new());
    stub.fail_default(FetchFailure::Network("connection refused".into()));

    let result = canon(&stub, "https://dead.example/a/b/?x=1#frag");

    // Normalized but unreduced; every stage recorded as rejected.
    assert_eq!(result.canonical_url, "https://dead.example/a/b/?x=1#frag");
    assert!(accepted_names(&result).is_empty());
    assert!(!result.trace.is_empty());
    assert!(result
        .trace
        .iter()
        .all(|e| e.outcome.unverified().is_some()));
}

#[test]
fn fail_closed_single_candidate_failure_is_never_accepted() {
    let stub = Arc::new(StubFetcher::new());
    stub.ok_default(200, SAME);
    stub.fail(
        "https://example.com/a/b?x=1",
        FetchFailure::Http(503),
    );
    stub.ok("https://example.com/a/?x=1", 200, OTHER);
    stub.ok("https://example.com/a/b/", 200, OTHER);

    // Trailing-slash candidate is unfetchable: rejected, not accepted.
    let result = canon(&stub, "https://example.com/a/b/?x=1");

    assert_eq!(result.canonical_url, "https://example.com/a/b/?x=1");
    let slash = result
        .trace
        .iter()
        .find(|e| e.step.name() == "drop-trailing-slash")
        .expect("slash stage ran");
    assert_eq!(slash.outcome.unverified(), Some("HTTP 503"));
}

#[test]
fn every_accepted_candidate_recvalidates_as_equivalent() {
    let stub = Arc::new(StubFetcher::new());
    stub.ok_default(200, SAME);
    stub.ok("https://example.com?utm_source=x&id=5", 200, OTHER);
    stub.ok("https://example.com/path", 200, OTHER);

    let raw = "https://example.com/path/?utm_source=x&id=5#frag";
    let result = canon(&stub, raw);

    let original = Url::parse(raw).unwrap().normalize();
    let oracle = EquivalenceOracle::new(
        Arc::clone(&stub) as Arc<dyn urlcanon_core::fetch::Fetcher>,
        Default::default(),
        Duration::from_secs(1),
        10,
    );
    for entry in result.accepted_steps() {
        let candidate = Url::parse(&entry.candidate).unwrap();
        assert_eq!(
            oracle.check(&original, &candidate),
            Verdict::Equivalent,
            "accepted step {} must re-validate",
            entry.step.name()
        );
    }
}

#[test]
fn query_removal_does_not_depend_on_evaluation_order() {
    // Any candidate missing b=2 is a different page; a and c are removable
    // regardless of the order they are evaluated in.
    let routes_other = [
        "https://t.test?a=1&b=2&c=3",
        "https://t.test?c=3&b=2&a=1",
        "https://t.test/p?c=3",
        "https://t.test/p?a=1",
    ];
    let stub = Arc::new(StubFetcher::new());
    stub.ok_default(200, SAME);
    for url in routes_other {
        stub.ok(url, 200, OTHER);
    }

    let forward = canon(&stub, "https://t.test/p?a=1&b=2&c=3");
    let backward = canon(&stub, "https://t.test/p?c=3&b=2&a=1");

    let removed = |r: &CanonicalResult| -> Vec<String> {
        let mut keys: Vec<String> = r
            .accepted_steps()
            .filter_map(|e| e.step.name().strip_prefix("drop-query-param:").map(str::to_string))
            .collect();
        keys.sort();
        keys
    };
    assert_eq!(removed(&forward), vec!["a", "c"]);
    assert_eq!(removed(&forward), removed(&backward));
    assert_eq!(forward.canonical_url, "https://t.test/p?b=2");
    assert_eq!(backward.canonical_url, "https://t.test/p?b=2");
}
