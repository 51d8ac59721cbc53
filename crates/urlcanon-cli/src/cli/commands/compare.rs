//! Compare command: one oracle check between two URLs.

use std::sync::Arc;

use anyhow::Result;
use urlcanon_core::config::CanonConfig;
use urlcanon_core::fetch::http::CurlFetcher;
use urlcanon_core::oracle::{EquivalenceOracle, Verdict};
use urlcanon_core::url_model::Url;

/// Fetch both URLs and print whether they serve the same page under the
/// configured signature strategy.
pub fn run_compare(cfg: &CanonConfig, a: &str, b: &str) -> Result<()> {
    let left = Url::parse(a)?.normalize();
    let right = Url::parse(b)?.normalize();
    let oracle = EquivalenceOracle::new(
        Arc::new(CurlFetcher::new()),
        cfg.signature_strategy,
        cfg.fetch_timeout(),
        cfg.redirect_hop_limit,
    );

    match oracle.check(&left, &right) {
        Verdict::Equivalent => println!("equivalent"),
        Verdict::Different => println!("different"),
        Verdict::Unverified(failure) => println!("unverified: {failure}"),
    }
    Ok(())
}
