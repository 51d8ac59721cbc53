//! urlcanon core: trial-and-verify URL canonicalization.
//!
//! Given a URL, propose shorter forms (no fragment, no trailing slash,
//! fewer path segments, fewer query parameters) and keep each reduction
//! only when the equivalence oracle confirms the page is still the same.

pub mod config;
pub mod logging;

pub mod fetch;
pub mod oracle;
pub mod reduce;
pub mod signature;
pub mod url_model;

pub use config::CanonConfig;
pub use reduce::{canonicalize, CanonicalResult};
