use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::signature::SignatureStrategy;

/// Which query keys stage 5 attempts to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryScope {
    /// Every key present in the URL (any key might be removable).
    #[default]
    All,
    /// Only keys on the tracking denylist, like the original heuristic.
    TrackingOnly,
}

/// Global configuration loaded from `~/.config/urlcanon/config.toml`.
/// Every field has a default so a missing or partial file still works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonConfig {
    /// Fingerprint precision used by the equivalence oracle.
    #[serde(default)]
    pub signature_strategy: SignatureStrategy,
    /// Per-fetch timeout in seconds (connect and total).
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Maximum redirect hops before a fetch fails with TooManyRedirects.
    #[serde(default = "default_redirect_hop_limit")]
    pub redirect_hop_limit: u32,
    /// Run the per-key query checks on a worker pool instead of one by one.
    #[serde(default)]
    pub parallel_query_checks: bool,
    /// Worker count for the parallel query stage.
    #[serde(default = "default_query_concurrency")]
    pub query_concurrency: usize,
    /// Which query keys are attempted at all.
    #[serde(default)]
    pub query_scope: QueryScope,
    /// Tracking-parameter denylist; extensible by the caller.
    #[serde(default = "default_tracking_params")]
    pub tracking_params: Vec<String>,
}

fn default_fetch_timeout_secs() -> u64 {
    5
}

fn default_redirect_hop_limit() -> u32 {
    10
}

fn default_query_concurrency() -> usize {
    4
}

/// Keys observed to be pure tracking noise across news sites, LinkedIn
/// emails and Mailchimp campaigns.
fn default_tracking_params() -> Vec<String> {
    [
        "utm_source",
        "utm_medium",
        "utm_campaign",
        "utm_term",
        "utm_content",
        "itm_source",
        "si",
        "trackingId",
        "refId",
        "midToken",
        "midSig",
        "trkEmail",
        "otpToken",
        "eid",
        "trk",
        "mc_eid",
        "mc_cid",
        "mc_lid",
        "mc_mid",
        "mc_rid",
        "mc_t",
        "mc_uid",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self {
            signature_strategy: SignatureStrategy::default(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            redirect_hop_limit: default_redirect_hop_limit(),
            parallel_query_checks: false,
            query_concurrency: default_query_concurrency(),
            query_scope: QueryScope::default(),
            tracking_params: default_tracking_params(),
        }
    }
}

impl CanonConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn is_tracking_param(&self, key: &str) -> bool {
        self.tracking_params.iter().any(|p| p == key)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("urlcanon")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CanonConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CanonConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: CanonConfig = toml::from_str(&data)?;
    Ok(cfg)
}
