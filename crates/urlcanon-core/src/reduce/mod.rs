//! The canonicalization engine: ordered, oracle-gated URL reductions.
//!
//! Types here describe the reduction vocabulary and the audit trace; the
//! staged algorithm lives in [`engine`], the opt-in worker pool for the
//! query stage in [`parallel`].

mod engine;
mod parallel;

pub use engine::canonicalize;

use serde::Serialize;

use crate::oracle::Verdict;
use crate::url_model::Url;

/// Whether a step fires at most once per run or is re-applied iteratively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepScope {
    Once,
    Iterated,
}

/// One candidate-generating transformation. `apply` is pure and total, and
/// idempotent on its own output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum ReductionStep {
    /// Clear the fragment.
    DropFragment,
    /// Remove the trailing path slash.
    DropTrailingSlash,
    /// Strip the last path segment.
    DropPathTail,
    /// Remove every query pair with this key.
    DropQueryParam { key: String },
}

impl ReductionStep {
    pub fn name(&self) -> String {
        match self {
            ReductionStep::DropFragment => "drop-fragment".to_string(),
            ReductionStep::DropTrailingSlash => "drop-trailing-slash".to_string(),
            ReductionStep::DropPathTail => "drop-path-tail".to_string(),
            ReductionStep::DropQueryParam { key } => format!("drop-query-param:{key}"),
        }
    }

    pub fn scope(&self) -> StepScope {
        match self {
            ReductionStep::DropFragment | ReductionStep::DropTrailingSlash => StepScope::Once,
            ReductionStep::DropPathTail | ReductionStep::DropQueryParam { .. } => {
                StepScope::Iterated
            }
        }
    }

    pub fn apply(&self, url: &Url) -> Url {
        match self {
            ReductionStep::DropFragment => url.with_fragment(None),
            ReductionStep::DropTrailingSlash => {
                url.with_path(url.path_segments().to_vec(), false)
            }
            ReductionStep::DropPathTail => {
                let mut segments = url.path_segments().to_vec();
                segments.pop();
                url.with_path(segments, url.has_trailing_slash())
            }
            ReductionStep::DropQueryParam { key } => url.without_query_key(key),
        }
    }
}

/// How a candidate fared. `RejectedDifferent` is a positive "the content
/// changed"; `RejectedUnverified` means the oracle could not confirm either
/// way (fail closed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "verdict", content = "reason")]
pub enum StepOutcome {
    Accepted,
    RejectedDifferent,
    RejectedUnverified(String),
}

impl From<Verdict> for StepOutcome {
    fn from(v: Verdict) -> Self {
        match v {
            Verdict::Equivalent => StepOutcome::Accepted,
            Verdict::Different => StepOutcome::RejectedDifferent,
            Verdict::Unverified(failure) => StepOutcome::RejectedUnverified(failure.to_string()),
        }
    }
}

impl StepOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, StepOutcome::Accepted)
    }

    pub fn unverified(&self) -> Option<&str> {
        match self {
            StepOutcome::RejectedUnverified(reason) => Some(reason),
            _ => None,
        }
    }
}

/// One audited decision: the step, the exact candidate URL the oracle saw,
/// and what became of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub step: ReductionStep,
    pub candidate: String,
    pub outcome: StepOutcome,
}

/// Append-only accept/reject record of one canonicalization run.
pub type CanonicalizationTrace = Vec<TraceEntry>;

/// Final product: the shortest confirmed-equivalent URL plus the full trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalResult {
    pub canonical_url: String,
    pub trace: CanonicalizationTrace,
}

impl CanonicalResult {
    pub fn accepted_steps(&self) -> impl Iterator<Item = &TraceEntry> {
        self.trace.iter().filter(|e| e.outcome.accepted())
    }
}
