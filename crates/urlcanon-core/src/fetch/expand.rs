//! Redirect expansion: resolve a short or tracking link to its final
//! landing URL without canonicalizing it.
//!
//! HEAD first to avoid pulling the body; some origins answer HEAD with
//! 400/403/405, in which case we repeat the chain with a plain GET.

use std::time::Duration;

use super::http::CurlFetcher;
use super::{FetchFailure, Fetcher};

/// Statuses where a HEAD answer says nothing about the GET resource.
pub(crate) fn head_needs_get_fallback(status: u32) -> bool {
    matches!(status, 400 | 403 | 405)
}

fn head_final(url: &str, timeout: Duration, max_redirects: u32) -> Result<(u32, String), FetchFailure> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;
    easy.max_redirections(max_redirects)?;
    easy.connect_timeout(timeout)?;
    easy.timeout(timeout)?;
    easy.perform()?;
    let status = easy.response_code()?;
    let final_url = match easy.effective_url() {
        Ok(Some(u)) => u.to_string(),
        _ => url.to_string(),
    };
    Ok((status, final_url))
}

/// Follow the redirect chain of `url` and return the final landing URL.
pub fn expand_redirect(
    url: &str,
    timeout: Duration,
    max_redirects: u32,
) -> Result<String, FetchFailure> {
    match head_final(url, timeout, max_redirects) {
        Ok((status, final_url)) if !head_needs_get_fallback(status) && status < 400 => {
            tracing::debug!(url, status, %final_url, "expanded via HEAD");
            return Ok(final_url);
        }
        Ok((status, _)) => {
            tracing::debug!(url, status, "HEAD inconclusive, retrying with GET");
        }
        Err(e) => {
            tracing::debug!(url, error = %e, "HEAD failed, retrying with GET");
        }
    }
    let result = CurlFetcher::new().fetch(url, timeout, max_redirects)?;
    Ok(result.final_url)
}
