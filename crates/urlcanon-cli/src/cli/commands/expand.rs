//! Expand command: resolve a redirect chain to its landing URL.

use anyhow::Result;
use urlcanon_core::config::CanonConfig;
use urlcanon_core::fetch::expand::expand_redirect;

/// Follow redirects from `url` and print the final URL.
pub fn run_expand(cfg: &CanonConfig, url: &str) -> Result<()> {
    let final_url = expand_redirect(url, cfg.fetch_timeout(), cfg.redirect_hop_limit)?;
    println!("{final_url}");
    Ok(())
}
