//! Canon command: run the full trial-and-verify reduction.

use std::sync::Arc;

use anyhow::Result;
use urlcanon_core::config::CanonConfig;
use urlcanon_core::fetch::http::CurlFetcher;
use urlcanon_core::fetch::Fetcher;
use urlcanon_core::reduce::StepOutcome;
use urlcanon_core::canonicalize;

/// Canonicalize `url` against the live network and print the result.
pub fn run_canon(cfg: &CanonConfig, url: &str, json: bool, show_trace: bool) -> Result<()> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(CurlFetcher::new());
    let result = canonicalize(url, fetcher, cfg)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if show_trace {
        for entry in &result.trace {
            let mark = match &entry.outcome {
                StepOutcome::Accepted => "+",
                StepOutcome::RejectedDifferent => "-",
                StepOutcome::RejectedUnverified(_) => "?",
            };
            match &entry.outcome {
                StepOutcome::RejectedUnverified(reason) => {
                    println!("{mark} {} {} ({reason})", entry.step.name(), entry.candidate);
                }
                _ => println!("{mark} {} {}", entry.step.name(), entry.candidate),
            }
        }
    }

    println!("{}", result.canonical_url);
    Ok(())
}
