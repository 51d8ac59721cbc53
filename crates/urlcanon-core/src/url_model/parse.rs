//! Raw-string parsing into the [`Url`] model.
//!
//! The split into components is byte-preserving; scheme and authority syntax
//! are delegated to the `url` crate for validation. Unusual but well-formed
//! URLs (empty path, empty query, non-ASCII, odd percent-escapes) are
//! accepted as opaque text; only structurally broken input is rejected.

use thiserror::Error;

use super::{QueryPair, Url};

/// Rejection reasons for [`Url::parse`]. Fatal to a canonicalization call:
/// no reduction is attempted on input we cannot faithfully rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No `scheme://` prefix.
    #[error("missing \"scheme://\" prefix")]
    MissingScheme,
    /// Scheme present but not `[A-Za-z][A-Za-z0-9+.-]*`.
    #[error("malformed scheme {0:?}")]
    MalformedScheme(String),
    /// Host/port part rejected by the URL syntax checker.
    #[error("unparseable authority {authority:?}: {reason}")]
    UnparseableAuthority { authority: String, reason: String },
    /// A `%00` escape: no origin serves NUL-addressed resources, and the
    /// escape breaks downstream header handling.
    #[error("escaped NUL (%00) in URL")]
    EscapedNul,
    /// Raw control characters (including newlines) are never valid in a URL.
    #[error("control character in URL")]
    ControlCharacter,
}

fn valid_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn contains_escaped_nul(raw: &str) -> bool {
    raw.as_bytes()
        .windows(3)
        .any(|w| w == b"%00")
}

fn parse_query(part: &str) -> Vec<QueryPair> {
    part.split('&')
        .map(|piece| match piece.split_once('=') {
            Some((k, v)) => (k.to_string(), Some(v.to_string())),
            None => (piece.to_string(), None),
        })
        .collect()
}

pub(super) fn parse(raw: &str) -> Result<Url, ParseError> {
    if raw.chars().any(|c| c.is_ascii_control()) {
        return Err(ParseError::ControlCharacter);
    }
    if contains_escaped_nul(raw) {
        return Err(ParseError::EscapedNul);
    }

    let (scheme, rest) = raw.split_once("://").ok_or(ParseError::MissingScheme)?;
    if !valid_scheme(scheme) {
        return Err(ParseError::MalformedScheme(scheme.to_string()));
    }

    let authority_end = rest
        .find(['/', '?', '#'])
        .unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    // Syntax check only; we keep the original bytes, not the crate's
    // normalized form.
    url::Url::parse(&format!("{scheme}://{authority}/")).map_err(|e| {
        ParseError::UnparseableAuthority {
            authority: authority.to_string(),
            reason: e.to_string(),
        }
    })?;

    let rest = &rest[authority_end..];
    let (before_fragment, fragment) = match rest.split_once('#') {
        Some((head, frag)) => (head, Some(frag.to_string())),
        None => (rest, None),
    };
    let (path_part, query) = match before_fragment.split_once('?') {
        Some((path, q)) => (path, parse_query(q)),
        None => (before_fragment, Vec::new()),
    };

    let (segments, trailing_slash) = match path_part.strip_prefix('/') {
        None => (Vec::new(), false), // empty path
        Some("") => (Vec::new(), true), // root "/"
        Some(inner) => {
            let mut segments: Vec<String> = inner.split('/').map(str::to_string).collect();
            let trailing = segments.last().is_some_and(|s| s.is_empty());
            if trailing {
                segments.pop();
            }
            (segments, trailing)
        }
    };

    Ok(Url::from_parts(
        scheme.to_string(),
        authority.to_string(),
        segments,
        trailing_slash,
        query,
        fragment,
    ))
}
