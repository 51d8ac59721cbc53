//! CLI for the urlcanon canonicalizer.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use urlcanon_core::config::{self, QueryScope};
use urlcanon_core::signature::SignatureStrategy;

use commands::{run_canon, run_compare, run_expand};

/// Top-level CLI for the urlcanon canonicalizer.
#[derive(Debug, Parser)]
#[command(name = "urlcanon")]
#[command(about = "urlcanon: reduce a URL to its shortest equivalent form", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Canonicalize a URL: try dropping the fragment, trailing slash, path
    /// tail and query parameters, keeping each reduction only if the page
    /// stays the same.
    Canon {
        /// HTTP/HTTPS URL to canonicalize.
        url: String,

        /// Fingerprint precision (status-only, status-title,
        /// status-title-body, structural-hash, full-hash).
        #[arg(long)]
        strategy: Option<SignatureStrategy>,

        /// Per-fetch timeout in seconds.
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Maximum redirect hops per fetch.
        #[arg(long, value_name = "N")]
        max_redirects: Option<u32>,

        /// Check query parameters on a small worker pool instead of one by one.
        #[arg(long)]
        parallel: bool,

        /// Only attempt keys on the tracking denylist (utm_* and friends).
        #[arg(long)]
        tracking_only: bool,

        /// Print the full result (canonical URL plus trace) as JSON.
        #[arg(long)]
        json: bool,

        /// Print every attempted reduction and its verdict.
        #[arg(long)]
        trace: bool,
    },

    /// Ask the equivalence oracle whether two URLs serve the same page.
    Compare {
        /// First URL.
        a: String,
        /// Second URL.
        b: String,

        /// Fingerprint precision, as for canon.
        #[arg(long)]
        strategy: Option<SignatureStrategy>,
    },

    /// Follow the redirect chain of a short or tracking link and print the
    /// final landing URL (no canonicalization).
    Expand {
        /// HTTP/HTTPS URL to expand.
        url: String,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Canon {
                url,
                strategy,
                timeout_secs,
                max_redirects,
                parallel,
                tracking_only,
                json,
                trace,
            } => {
                if let Some(strategy) = strategy {
                    cfg.signature_strategy = strategy;
                }
                if let Some(secs) = timeout_secs {
                    cfg.fetch_timeout_secs = secs;
                }
                if let Some(hops) = max_redirects {
                    cfg.redirect_hop_limit = hops;
                }
                if parallel {
                    cfg.parallel_query_checks = true;
                }
                if tracking_only {
                    cfg.query_scope = QueryScope::TrackingOnly;
                }
                run_canon(&cfg, &url, json, trace)?;
            }
            CliCommand::Compare { a, b, strategy } => {
                if let Some(strategy) = strategy {
                    cfg.signature_strategy = strategy;
                }
                run_compare(&cfg, &a, &b)?;
            }
            CliCommand::Expand { url } => run_expand(&cfg, &url)?,
        }

        Ok(())
    }
}
