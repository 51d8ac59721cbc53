//! Comparable content fingerprints.
//!
//! A [`Signature`] condenses a fetch outcome under a chosen
//! [`SignatureStrategy`]; the oracle only ever asks whether two signatures
//! are equal. Failed fetches map to [`Signature::Unfetchable`], which is
//! equal to nothing — not even itself — so two dead URLs can never be
//! mistaken for the same page.

pub mod html;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::fetch::{FetchFailure, FetchResult};

/// Fingerprint precision, in increasing precision/cost order. Pinned per
/// canonicalization run; the oracle never mixes strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureStrategy {
    /// HTTP status code only.
    StatusOnly,
    /// Status plus page title (og:title preferred over `<title>`).
    #[default]
    StatusTitle,
    /// Status, title, and a digest of the visible body text.
    StatusTitleBody,
    /// Digest of the markup skeleton with all text blanked and ephemeral
    /// elements (scripts, nonces, per-request meta tags) stripped.
    StructuralHash,
    /// Digest of the raw body bytes.
    FullHash,
}

impl SignatureStrategy {
    pub const ALL: [SignatureStrategy; 5] = [
        SignatureStrategy::StatusOnly,
        SignatureStrategy::StatusTitle,
        SignatureStrategy::StatusTitleBody,
        SignatureStrategy::StructuralHash,
        SignatureStrategy::FullHash,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SignatureStrategy::StatusOnly => "status-only",
            SignatureStrategy::StatusTitle => "status-title",
            SignatureStrategy::StatusTitleBody => "status-title-body",
            SignatureStrategy::StructuralHash => "structural-hash",
            SignatureStrategy::FullHash => "full-hash",
        }
    }
}

impl fmt::Display for SignatureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignatureStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| format!("unknown signature strategy {s:?} (expected one of: status-only, status-title, status-title-body, structural-hash, full-hash)"))
    }
}

/// Opaque comparable fingerprint. Equality is the only supported question.
#[derive(Debug, Clone)]
pub enum Signature {
    /// Sentinel for a failed fetch. Never equal to anything.
    Unfetchable,
    Status(u32),
    StatusTitle { status: u32, title: String },
    StatusTitleBody { status: u32, title: String, body_digest: String },
    Structural { digest: String },
    Full { digest: String },
}

// Deliberately non-reflexive for Unfetchable (hence no Eq impl): a fetch
// that produced nothing confirms nothing.
impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        use Signature::*;
        match (self, other) {
            (Unfetchable, _) | (_, Unfetchable) => false,
            (Status(a), Status(b)) => a == b,
            (
                StatusTitle { status: sa, title: ta },
                StatusTitle { status: sb, title: tb },
            ) => sa == sb && ta == tb,
            (
                StatusTitleBody { status: sa, title: ta, body_digest: da },
                StatusTitleBody { status: sb, title: tb, body_digest: db },
            ) => sa == sb && ta == tb && da == db,
            (Structural { digest: a }, Structural { digest: b }) => a == b,
            (Full { digest: a }, Full { digest: b }) => a == b,
            _ => false,
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compute the fingerprint of a fetch outcome. Pure given its inputs.
pub fn extract(
    result: &Result<FetchResult, FetchFailure>,
    strategy: SignatureStrategy,
) -> Signature {
    let Ok(res) = result else {
        return Signature::Unfetchable;
    };
    match strategy {
        SignatureStrategy::StatusOnly => Signature::Status(res.status),
        SignatureStrategy::StatusTitle => {
            let body = String::from_utf8_lossy(&res.body);
            Signature::StatusTitle {
                status: res.status,
                title: html::page_title(&body),
            }
        }
        SignatureStrategy::StatusTitleBody => {
            let body = String::from_utf8_lossy(&res.body);
            Signature::StatusTitleBody {
                status: res.status,
                title: html::page_title(&body),
                body_digest: sha256_hex(html::visible_text(&body).as_bytes()),
            }
        }
        SignatureStrategy::StructuralHash => {
            let body = String::from_utf8_lossy(&res.body);
            Signature::Structural {
                digest: sha256_hex(html::structural_markup(&body).as_bytes()),
            }
        }
        SignatureStrategy::FullHash => Signature::Full {
            digest: sha256_hex(&res.body),
        },
    }
}
