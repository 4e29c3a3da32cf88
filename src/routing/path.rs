//! Path normalization and location parsing.
//!
//! # Responsibilities
//! - Split a raw location into path, query and hash
//! - Normalize the path to canonical form (`/a/b`, never `/a//b/`)
//! - Decode path segments and query pairs
//!
//! # Design Decisions
//! - Canonical paths are returned borrowed, only malformed ones allocate
//! - Backslashes are treated as separators
//! - Undecodable percent sequences are kept verbatim rather than rejected

use std::borrow::Cow;
use std::collections::HashMap;

/// A raw location split at its `?` and `#` delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub hash: Option<&'a str>,
}

impl<'a> Location<'a> {
    /// Split `raw` into path, query and hash. The hash is everything after the
    /// first `#`; the query is everything between the first `?` and the hash.
    pub fn parse(raw: &'a str) -> Self {
        let (rest, hash) = match raw.split_once('#') {
            Some((rest, hash)) => (rest, Some(hash)),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        Self { path, query, hash }
    }
}

/// Returns true if `path` is already canonical.
pub fn is_canonical(path: &str) -> bool {
    if !path.starts_with('/') || path.contains("//") || path.contains('\\') {
        return false;
    }
    path == "/" || !path.ends_with('/')
}

/// Normalize a path: backslashes become `/`, duplicate and trailing slashes
/// are collapsed, and an empty path becomes `/`.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_canonical(path) {
        return Cow::Borrowed(path);
    }

    let joined = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    Cow::Owned(format!("/{}", joined))
}

/// Non-empty segments of a (normalized) path.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Percent-decode a path segment.
pub fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| segment.to_string())
}

/// Percent-encode a parameter value for use inside a single path segment.
pub fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Parse a query string into a map. `+` decodes to a space; a repeated key
/// keeps its last value; a key without `=` maps to an empty string.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_query_part(key), decode_query_part(value))
        })
        .collect()
}

fn decode_query_part(part: &str) -> String {
    decode_segment(&part.replace('+', " "))
}
