// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pattern tables with deterministic priority ordering.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use hashbrown::HashMap;

use crate::segments::{match_segments, split_segments};

/// A successful match of a path against one pattern in a [`PatternSet`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMatch {
    /// The pattern that matched.
    pub name: String,
    /// Decoded values captured by `:name` segments.
    pub params: HashMap<String, String>,
    /// The concrete segments consumed by the pattern, still encoded.
    pub matched: Vec<String>,
    /// Decoded segments swallowed by a trailing `*`, if the pattern has one.
    pub unused: Option<Vec<String>>,
}

/// Rank of one pattern segment for priority comparison.
///
/// Lower ranks are more specific and are tried first: a literal beats a
/// `:param`, a `:param` beats a missing segment (shorter pattern), and a
/// missing segment beats the catch-all `*`.
fn segment_rank(segment: Option<&str>) -> u8 {
    match segment {
        Some("*") => 3,
        None => 2,
        Some(s) if s.starts_with(':') => 1,
        Some(_) => 0,
    }
}

/// Total priority order over patterns.
///
/// Segments are compared left to right by [`segment_rank`], with ties
/// between literals broken by name. Two distinct `:param` segments tie (the
/// capture name does not affect what they match), so fully rank-equal
/// patterns fall back to segment count and finally the raw pattern text,
/// keeping the order independent of insertion order.
fn compare_patterns(a: &str, b: &str) -> Ordering {
    let a_segs = split_segments(a);
    let b_segs = split_segments(b);
    let len = a_segs.len().max(b_segs.len());

    for i in 0..len {
        let sa = a_segs.get(i).copied();
        let sb = b_segs.get(i).copied();
        if sa == sb {
            continue;
        }
        let (ra, rb) = (segment_rank(sa), segment_rank(sb));
        match ra.cmp(&rb) {
            Ordering::Equal => {
                if ra == 0 {
                    // Distinct literals; order by name.
                    return sa.cmp(&sb);
                }
                // Distinct param names tie at this position.
            }
            ord => return ord,
        }
    }

    a_segs.len().cmp(&b_segs.len()).then_with(|| a.cmp(b))
}

/// A set of route patterns kept in deterministic priority order.
///
/// Matching walks patterns from most to least specific and returns the
/// first hit, so for the set `{"", ":id", "help"}` the path `/help` matches
/// `help` and never `:id`, no matter the insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternSet {
    /// Sorted by [`compare_patterns`].
    patterns: Vec<String>,
}

impl PatternSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pattern at its priority position. Duplicates are ignored.
    pub fn insert(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if self.patterns.iter().any(|p| *p == pattern) {
            return;
        }
        let at = self
            .patterns
            .binary_search_by(|p| compare_patterns(p, &pattern))
            .unwrap_or_else(|insertion| insertion);
        self.patterns.insert(at, pattern);
    }

    /// Whether the set holds this exact pattern.
    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.iter().any(|p| p == pattern)
    }

    /// The patterns in priority order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Number of patterns in the set.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Match a path against the set, returning the first (highest-priority)
    /// pattern that accepts it.
    pub fn match_path(&self, path: &str) -> Option<PatternMatch> {
        let actual = split_segments(path);
        for pattern in &self.patterns {
            let pattern_segs = split_segments(pattern);
            if let Some(m) = match_segments(&actual, &pattern_segs) {
                return Some(PatternMatch {
                    name: pattern.clone(),
                    params: m.params,
                    matched: m.matched,
                    unused: m.unused,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn set(patterns: &[&str]) -> PatternSet {
        let mut s = PatternSet::new();
        for p in patterns {
            s.insert(*p);
        }
        s
    }

    #[test]
    fn static_beats_param_beats_catch_all() {
        let s = set(&["", ":id", "help", "*"]);

        assert_eq!(s.match_path("/help").unwrap().name, "help");
        assert_eq!(s.match_path("/other").unwrap().name, ":id");
        assert_eq!(s.match_path("/").unwrap().name, "");
        assert_eq!(s.match_path("/a/b").unwrap().name, "*");
    }

    #[test]
    fn order_is_insertion_independent() {
        let forward = set(&["", "fist/route", "second/route/*", "four/:id", ":five/asd", ":six", ":seven/*", "*"]);
        let backward = set(&["*", ":seven/*", ":six", ":five/asd", "four/:id", "second/route/*", "fist/route", ""]);
        assert_eq!(forward.patterns(), backward.patterns());
    }

    #[test]
    fn full_priority_order() {
        let s = set(&["", "fist/route", "second/route/*", "four/:id", ":five/asd", ":six", ":seven/*", "*"]);
        assert_eq!(
            s.patterns(),
            &[
                "fist/route".to_string(),
                "four/:id".to_string(),
                "second/route/*".to_string(),
                ":five/asd".to_string(),
                ":six".to_string(),
                ":seven/*".to_string(),
                "".to_string(),
                "*".to_string(),
            ]
        );
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut s = set(&["a", "b"]);
        s.insert("a");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn match_carries_params_and_remainder() {
        let s = set(&["user/:id/*"]);
        let m = s.match_path("/user/42/files/doc").unwrap();
        assert_eq!(m.name, "user/:id/*");
        assert_eq!(m.params["id"], "42");
        assert_eq!(m.matched, vec!["user", "42"]);
        assert_eq!(m.unused, Some(vec!["files".to_string(), "doc".to_string()]));
    }

    #[test]
    fn no_match_returns_none() {
        let s = set(&["user/:id"]);
        assert!(s.match_path("/team/1").is_none());
        assert!(PatternSet::new().match_path("/anything").is_none());
    }

    #[test]
    fn deeper_static_beats_shallow_param_prefix() {
        // At position 0, the literal wins regardless of later segments.
        let s = set(&[":section", "settings/advanced"]);
        assert_eq!(s.match_path("/settings").unwrap().name, ":section");
        assert_eq!(
            s.match_path("/settings/advanced").unwrap().name,
            "settings/advanced"
        );
    }
}
