//! Bounded worker pool for the query stage.
//!
//! Per-key checks are mutually independent (each compares the frozen
//! original against the stage-entry URL minus that one key), so they can
//! run on a few OS threads: a shared work queue feeds workers, verdicts
//! come back over a channel, and decisions are reassembled in input order
//! before anything is committed.

use std::collections::VecDeque;
use std::sync::{mpsc, Mutex};

use crate::oracle::{EquivalenceOracle, Verdict};
use crate::url_model::Url;

use super::ReductionStep;

/// Check all `keys` for removability against `original`, candidates built
/// from `base`. Returns one decision per answered key, in input order.
pub(super) fn check_keys(
    oracle: &EquivalenceOracle,
    original: &Url,
    base: &Url,
    keys: &[String],
    max_concurrent: usize,
) -> Vec<(ReductionStep, Url, Verdict)> {
    let work: Mutex<VecDeque<(usize, String)>> =
        Mutex::new(keys.iter().cloned().enumerate().collect());
    let workers = max_concurrent.max(1).min(keys.len());
    let (tx, rx) = mpsc::channel();

    let mut slots: Vec<Option<(ReductionStep, Url, Verdict)>> =
        (0..keys.len()).map(|_| None).collect();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let work = &work;
            scope.spawn(move || loop {
                let Some((index, key)) = work.lock().unwrap().pop_front() else {
                    break;
                };
                let candidate = base.without_query_key(&key);
                let verdict = oracle.check(original, &candidate);
                let _ = tx.send((index, key, candidate, verdict));
            });
        }
        drop(tx);

        for (index, key, candidate, verdict) in rx {
            slots[index] = Some((ReductionStep::DropQueryParam { key }, candidate, verdict));
        }
    });

    let mut decisions = Vec::with_capacity(keys.len());
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(decision) => decisions.push(decision),
            // A panicked worker leaves a hole; treat the key as undecided
            // (kept), consistent with fail-closed.
            None => tracing::warn!(key = %keys[index], "query check worker gave no verdict"),
        }
    }
    decisions
}
