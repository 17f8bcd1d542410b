// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query string parsing and serialization.
//!
//! Query pairs are kept as an ordered `Vec` rather than a map so that the
//! serialized form is stable and repeated keys survive a round trip.

use alloc::string::String;
use alloc::vec::Vec;

use crate::segments::{decode_component, encode_component};

/// Parse a query string into decoded key/value pairs.
///
/// A leading `?` is tolerated. Pairs without a `=` parse as a key with an
/// empty value; empty pairs (`a=1&&b=2`) are skipped.
pub fn parse_query(search: &str) -> Vec<(String, String)> {
    let search = search.strip_prefix('?').unwrap_or(search);
    search
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Serialize key/value pairs into a query string without the leading `?`.
///
/// Returns an empty string for no pairs.
pub fn build_query(pairs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&encode_component(key));
        out.push('=');
        out.push_str(&encode_component(value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn pairs(input: &[(&str, &str)]) -> Vec<(String, String)> {
        input
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_tolerates_leading_question_mark() {
        assert_eq!(parse_query("?a=1&b=2"), pairs(&[("a", "1"), ("b", "2")]));
        assert_eq!(parse_query("a=1&b=2"), pairs(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn parse_handles_bare_keys_and_empty_pairs() {
        assert_eq!(parse_query("flag&&a=1"), pairs(&[("flag", ""), ("a", "1")]));
        assert!(parse_query("").is_empty());
        assert!(parse_query("?").is_empty());
    }

    #[test]
    fn build_empty_is_empty_string() {
        assert_eq!(build_query(&[]), "");
    }

    #[test]
    fn pairs_with_empty_values_round_trip() {
        let input = pairs(&[("a", ""), ("b", "2")]);
        assert_eq!(parse_query(&build_query(&input)), input);
    }

    #[test]
    fn values_are_encoded() {
        let input = pairs(&[("q", "a b&c=d")]);
        let search = build_query(&input);
        assert_eq!(search, "q=a%20b%26c%3Dd");
        assert_eq!(parse_query(&search), input);
    }

    #[test]
    fn repeated_keys_preserved_in_order() {
        let input = pairs(&[("t", "1"), ("t", "2")]);
        assert_eq!(parse_query(&build_query(&input)), input);
    }
}
