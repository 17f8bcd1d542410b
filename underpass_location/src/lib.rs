// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Underpass Location: immutable route locations and path pattern matching.
//!
//! This crate is the value-type layer of the Underpass navigation stack. It
//! knows nothing about navigators or rendering; it only deals in paths.
//!
//! - [`Location`]: an immutable snapshot of where a route points (route name,
//!   parameter values, query string, hash fragment, and the leftover path a
//!   nested navigator consumes).
//! - Segment helpers: [`split_segments`], [`match_segments`],
//!   [`merge_path_with_params`], and [`param_names`] implement the `:param`
//!   and trailing-`*` pattern grammar.
//! - [`PatternSet`]: a collection of patterns with a deterministic priority
//!   order, so `help` always beats `:id` which always beats `*`, regardless
//!   of insertion order.
//! - Query helpers: [`parse_query`] and [`build_query`] for `?key=value`
//!   strings.
//!
//! Paths are slash-separated with empty segments ignored, so `/user//3/` and
//! `user/3` describe the same location. Parameter values are
//! percent-decoded when matched and percent-encoded when substituted.
//!
//! ## Example
//!
//! ```rust
//! use underpass_location::{Location, LocationParts, PatternSet};
//!
//! let mut patterns = PatternSet::new();
//! patterns.insert("user/:id");
//! patterns.insert("user/new");
//!
//! // Static segments win over parameters.
//! let m = patterns.match_path("/user/new").unwrap();
//! assert_eq!(m.name, "user/new");
//!
//! let m = patterns.match_path("/user/42").unwrap();
//! assert_eq!(m.params["id"], "42");
//!
//! let location = Location::new(
//!     "user/:id",
//!     LocationParts {
//!         pathname: Some("user/42".into()),
//!         ..Default::default()
//!     },
//! )
//! .unwrap();
//! assert_eq!(location.pathname(), "user/42");
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod location;
mod query;
mod segments;
mod table;

pub use location::{Location, LocationError, LocationParts};
pub use query::{build_query, parse_query};
pub use segments::{
    SegmentMatch, decode_component, encode_component, match_segments, merge_path_with_params,
    param_names, split_segments,
};
pub use table::{PatternMatch, PatternSet};
