// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path segment splitting, pattern matching, and parameter substitution.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use smallvec::SmallVec;

/// Characters escaped when encoding a single path or query component.
///
/// This is the complement of the set JavaScript's `encodeURIComponent`
/// leaves alone, so values round-trip with URLs produced by web hosts.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single path or query component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Percent-decode a single path or query component.
///
/// Invalid UTF-8 in the decoded bytes is replaced rather than rejected;
/// locations never fail to parse on malformed input.
pub fn decode_component(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Split a path into its non-empty segments.
///
/// Leading, trailing, and repeated slashes are insignificant: `/a//b/` and
/// `a/b` both split into `["a", "b"]`.
pub fn split_segments(path: &str) -> SmallVec<[&str; 8]> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// The `:name` parameters of a pattern, in order of appearance.
pub fn param_names(pattern: &str) -> Vec<String> {
    split_segments(pattern)
        .iter()
        .filter_map(|s| s.strip_prefix(':'))
        .map(ToString::to_string)
        .collect()
}

/// The result of matching a concrete path against a pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentMatch {
    /// Decoded values captured by `:name` segments, keyed by name.
    pub params: HashMap<String, String>,
    /// The concrete segments consumed by the pattern, still encoded.
    pub matched: Vec<String>,
    /// Decoded segments swallowed by a trailing `*`, if the pattern has one.
    pub unused: Option<Vec<String>>,
}

/// Match concrete path segments against pattern segments.
///
/// Pattern segments are compared positionally: a literal must be equal, a
/// `:name` segment captures the decoded value, and a `*` in the final
/// position captures all remaining segments into [`SegmentMatch::unused`].
/// Without a trailing `*` the segment counts must be equal. A `*` anywhere
/// but last is treated as a literal.
pub fn match_segments(actual: &[&str], pattern: &[&str]) -> Option<SegmentMatch> {
    let mut params = HashMap::new();
    let mut matched = Vec::new();

    for (i, &pat) in pattern.iter().enumerate() {
        if pat == "*" && i == pattern.len() - 1 {
            let unused = actual
                .get(i..)
                .unwrap_or(&[])
                .iter()
                .map(|s| decode_component(s))
                .collect();
            return Some(SegmentMatch {
                params,
                matched,
                unused: Some(unused),
            });
        }

        let &seg = actual.get(i)?;

        if let Some(name) = pat.strip_prefix(':') {
            params.insert(name.to_string(), decode_component(seg));
            matched.push(seg.to_string());
        } else if pat != seg {
            return None;
        } else {
            matched.push(seg.to_string());
        }
    }

    if actual.len() != pattern.len() {
        return None;
    }

    Some(SegmentMatch {
        params,
        matched,
        unused: None,
    })
}

/// Substitute parameter values back into a pattern.
///
/// Each `:name` segment is replaced with the encoded value from `params`;
/// segments with no corresponding value are left in place. The result is
/// slash-joined without a leading slash.
pub fn merge_path_with_params(pattern: &str, params: &HashMap<String, String>) -> String {
    let segs: Vec<String> = split_segments(pattern)
        .iter()
        .map(|&seg| match seg.strip_prefix(':') {
            Some(name) => match params.get(name) {
                Some(value) => encode_component(value),
                None => seg.to_string(),
            },
            None => seg.to_string(),
        })
        .collect();
    segs.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn split_ignores_empty_segments() {
        assert_eq!(split_segments("/a//b/").as_slice(), ["a", "b"]);
        assert_eq!(split_segments("a/b").as_slice(), ["a", "b"]);
        assert!(split_segments("").is_empty());
        assert!(split_segments("///").is_empty());
    }

    #[test]
    fn literal_match_requires_equal_length() {
        let m = match_segments(&["user", "new"], &["user", "new"]).unwrap();
        assert!(m.params.is_empty());
        assert_eq!(m.matched, vec!["user", "new"]);
        assert_eq!(m.unused, None);

        assert!(match_segments(&["user"], &["user", "new"]).is_none());
        assert!(match_segments(&["user", "new", "x"], &["user", "new"]).is_none());
        assert!(match_segments(&["user", "old"], &["user", "new"]).is_none());
    }

    #[test]
    fn params_are_captured_and_decoded() {
        let m = match_segments(&["user", "a%20b"], &["user", ":id"]).unwrap();
        assert_eq!(m.params["id"], "a b");
        assert_eq!(m.matched, vec!["user", "a%20b"]);
    }

    #[test]
    fn trailing_catch_all_captures_remainder() {
        let m = match_segments(&["app", "settings", "profile"], &["app", "*"]).unwrap();
        assert_eq!(m.matched, vec!["app"]);
        assert_eq!(m.unused, Some(vec!["settings".to_string(), "profile".to_string()]));

        // Nothing left over still matches, with an empty remainder.
        let m = match_segments(&["app"], &["app", "*"]).unwrap();
        assert_eq!(m.unused, Some(vec![]));
    }

    #[test]
    fn non_trailing_star_is_a_literal() {
        assert!(match_segments(&["a", "x", "b"], &["a", "*", "b"]).is_none());
        assert!(match_segments(&["a", "*", "b"], &["a", "*", "b"]).is_some());
    }

    #[test]
    fn merge_substitutes_and_encodes() {
        let p = params(&[("id", "a b")]);
        assert_eq!(merge_path_with_params("user/:id", &p), "user/a%20b");
    }

    #[test]
    fn merge_leaves_unknown_params_in_place() {
        let p = params(&[]);
        assert_eq!(merge_path_with_params("user/:id/edit", &p), "user/:id/edit");
    }

    #[test]
    fn param_names_in_order() {
        assert_eq!(param_names("a/:x/b/:y/*"), vec!["x", "y"]);
        assert!(param_names("a/b").is_empty());
    }

    #[test]
    fn component_round_trip() {
        let original = "a b/ü&?=#";
        let encoded = encode_component(original);
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('/'));
        assert_eq!(decode_component(&encoded), original);
    }
}
