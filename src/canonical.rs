//! Path canonicalization.
//!
//! Metadata lookups are keyed by path, but the same page can be addressed by
//! several textually different URLs: with or without a trailing slash, and
//! with query parameters in any order. Stored paths and incoming request
//! paths are both run through [`canonicalize_path`] so the two meet in the
//! middle — `/x/?b=2&a=1` and `/x/?a=1&b=2` resolve to the same record.
//!
//! The algorithm:
//!
//! 1. **Trailing slash**: when the host follows the append-slash convention,
//!    a slash is appended to the path component — unless it already ends in
//!    one, or its last segment looks like a filename (contains a dot).
//! 2. **Query string**: parsed into key–value pairs, sorted lexicographically
//!    by key (stable, so equal keys keep their relative order), percent-decoded
//!    and re-encoded, and reattached. Pairs with an empty value are dropped.
//! 3. **Fragment**: preserved verbatim.
//!
//! Canonicalization is idempotent: running it twice yields the same string
//! as running it once.

use std::borrow::Cow;

/// Canonicalize a request or stored path.
///
/// `append_slash` is the host-wide convention flag; it only affects the path
/// component, never the query string or fragment.
pub fn canonicalize_path(path: &str, append_slash: bool) -> String {
    let (rest, fragment) = match path.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (path, None),
    };
    let (path_part, query) = match rest.split_once('?') {
        Some((path_part, query)) => (path_part, Some(query)),
        None => (rest, None),
    };

    let mut out = if append_slash {
        append_trailing_slash(path_part)
    } else {
        path_part.to_string()
    };

    if let Some(query) = query {
        let mut pairs = parse_query(query);
        // Stable sort: equal keys keep their original relative order.
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        if !pairs.is_empty() {
            out.push('?');
            out.push_str(&encode_query(&pairs));
        }
    }

    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }

    out
}

/// Append a trailing slash to a path component, unless it already has one
/// or its last segment looks like a filename (`/docs/readme.txt`).
fn append_trailing_slash(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        return path.to_string();
    }
    let last_segment = path.rsplit('/').next().unwrap_or("");
    if last_segment.contains('.') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Parse a raw query string into decoded key–value pairs.
///
/// Pairs with an empty key or empty value are dropped, matching the
/// keep-blank-values=false convention of most query-string parsers.
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((decode_component(key), decode_component(value)))
        })
        .collect()
}

/// Percent-decode one query component, treating `+` as a space.
fn decode_component(component: &str) -> String {
    let with_spaces = component.replace('+', " ");
    if let Ok(decoded) = urlencoding::decode(&with_spaces) {
        return decoded.into_owned();
    }
    // Invalid percent escapes are kept as-is rather than rejected; they
    // still compare consistently between store and request.
    with_spaces
}

/// Re-encode sorted pairs into a query string.
fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            let key: Cow<'_, str> = urlencoding::encode(key);
            let value: Cow<'_, str> = urlencoding::encode(value);
            format!("{key}={value}")
        })
        .collect::<Vec<_>>()
        .join("&")
}
