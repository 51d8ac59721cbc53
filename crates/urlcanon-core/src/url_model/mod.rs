//! Immutable URL value model.
//!
//! A `Url` is a structural decomposition of an http(s)-style URL into
//! scheme, authority, path segments, query pairs and fragment. Rendering is
//! byte-preserving: percent-escapes, casing and duplicate query keys come
//! back out exactly as they went in. Normalization is a separate, explicit
//! operation; nothing is normalized implicitly during parse or render.
//!
//! Every builder returns a fresh value, so speculative reduction candidates
//! never alias the accepted working URL.

mod parse;

pub use parse::ParseError;

use std::fmt;

/// One `key[=value]` query pair. `None` means the `=` was absent entirely
/// (`?flag`), which renders differently from an empty value (`?flag=`).
pub type QueryPair = (String, Option<String>);

/// Decomposed, immutable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    scheme: String,
    authority: String,
    /// Path segments between slashes. Empty segments from `//` are kept.
    segments: Vec<String>,
    /// True when the path ends in `/`. The root path is
    /// `segments == [] && trailing_slash`.
    trailing_slash: bool,
    /// Ordered query multimap; duplicates and order preserved. Empty means
    /// the URL had no `?` at all.
    query: Vec<QueryPair>,
    /// `Some("")` for a bare trailing `#`.
    fragment: Option<String>,
}

impl Url {
    /// Parse a raw URL string. See [`ParseError`] for the rejection rules.
    pub fn parse(raw: &str) -> Result<Url, ParseError> {
        parse::parse(raw)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn path_segments(&self) -> &[String] {
        &self.segments
    }

    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// True for a bare `/` path (nothing to strip below it).
    pub fn path_is_root(&self) -> bool {
        self.segments.is_empty() && self.trailing_slash
    }

    pub fn query(&self) -> &[QueryPair] {
        &self.query
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Distinct non-empty query keys in first-occurrence order.
    pub fn query_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for (k, _) in &self.query {
            if !k.is_empty() && !keys.iter().any(|seen| seen == k) {
                keys.push(k.clone());
            }
        }
        keys
    }

    /// Returns a copy with the fragment replaced.
    pub fn with_fragment(&self, fragment: Option<String>) -> Url {
        Url {
            fragment,
            ..self.clone()
        }
    }

    /// Returns a copy with the path replaced.
    pub fn with_path(&self, segments: Vec<String>, trailing_slash: bool) -> Url {
        Url {
            segments,
            trailing_slash,
            ..self.clone()
        }
    }

    /// Returns a copy with the query replaced. An empty vec removes the `?`
    /// entirely.
    pub fn with_query(&self, query: Vec<QueryPair>) -> Url {
        Url {
            query,
            ..self.clone()
        }
    }

    /// Returns a copy with every pair whose key equals `key` removed.
    pub fn without_query_key(&self, key: &str) -> Url {
        self.with_query(
            self.query
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
        )
    }

    /// Explicit normalization, applied once before reduction:
    /// lowercases scheme and authority, strips the default port for the
    /// scheme, and collapses a redundant trailing empty path segment
    /// (`/a//` becomes `/a/`). The trailing slash itself is kept; removing
    /// it is an oracle-gated reduction, not a rewrite.
    pub fn normalize(&self) -> Url {
        let scheme = self.scheme.to_ascii_lowercase();
        let mut authority = self.authority.to_ascii_lowercase();
        let default_port = match scheme.as_str() {
            "http" => Some(":80"),
            "https" => Some(":443"),
            _ => None,
        };
        if let Some(suffix) = default_port {
            if let Some(host) = authority.strip_suffix(suffix) {
                authority = host.to_string();
            }
        }
        let mut segments = self.segments.clone();
        if segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        Url {
            scheme,
            authority,
            segments,
            trailing_slash: self.trailing_slash,
            query: self.query.clone(),
            fragment: self.fragment.clone(),
        }
    }

    /// Reassemble the URL string. Inverse of [`Url::parse`] for every URL
    /// the parser accepts.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.scheme.len() + self.authority.len() + 16);
        out.push_str(&self.scheme);
        out.push_str("://");
        out.push_str(&self.authority);
        if !self.segments.is_empty() {
            out.push('/');
            out.push_str(&self.segments.join("/"));
            if self.trailing_slash {
                out.push('/');
            }
        } else if self.trailing_slash {
            out.push('/');
        }
        if !self.query.is_empty() {
            out.push('?');
            let mut first = true;
            for (k, v) in &self.query {
                if !first {
                    out.push('&');
                }
                first = false;
                out.push_str(k);
                if let Some(v) = v {
                    out.push('=');
                    out.push_str(v);
                }
            }
        }
        if let Some(frag) = &self.fragment {
            out.push('#');
            out.push_str(frag);
        }
        out
    }

    pub(crate) fn from_parts(
        scheme: String,
        authority: String,
        segments: Vec<String>,
        trailing_slash: bool,
        query: Vec<QueryPair>,
        fragment: Option<String>,
    ) -> Url {
        Url {
            scheme,
            authority,
            segments,
            trailing_slash,
            query,
            fragment,
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
