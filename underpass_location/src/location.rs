// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Location`] value type.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::query::{build_query, parse_query};
use crate::segments::{match_segments, merge_path_with_params, param_names, split_segments};

/// Optional inputs for constructing a [`Location`].
///
/// All fields default to "absent". When `pathname` is given it is matched
/// against the route name to contribute parameter values (and, for catch-all
/// routes, the child path); explicit `params` win over matched ones. `query`
/// pairs, when given, take precedence over a raw `search` string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationParts {
    /// A concrete path to match against the route name.
    pub pathname: Option<String>,
    /// Explicit parameter values, overriding any matched from `pathname`.
    pub params: HashMap<String, String>,
    /// Decoded query pairs; serialized into the search string.
    pub query: Option<Vec<(String, String)>>,
    /// A raw search string, with or without the leading `?`.
    pub search: Option<String>,
    /// The hash fragment, with or without the leading `#`.
    pub hash: Option<String>,
    /// The leftover path consumed by a nested navigator.
    pub child_path: Option<String>,
}

/// Failure to construct a [`Location`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// A `:param` of the route name has no value to substitute.
    #[error("missing value for parameter `{name}` of route `{route}`")]
    MissingParam {
        /// The parameter with no value.
        name: String,
        /// The route name being constructed.
        route: String,
    },
}

/// An immutable snapshot of where a route points.
///
/// A location pairs a route name (the pattern, e.g. `user/:id`) with the
/// parameter values needed to produce a concrete path, plus the query
/// string, hash fragment, and the child path a nested navigator consumes.
///
/// Locations never mutate; [`Location::with_child_path`] and
/// [`Location::with_query`] return new values. Route histories are plain
/// vectors of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    route_name: String,
    params: HashMap<String, String>,
    param_names: Vec<String>,
    search: String,
    hash: String,
    child_path: Option<String>,
}

impl Location {
    /// Construct a location for a route name.
    ///
    /// Fails with [`LocationError::MissingParam`] if any `:param` of the
    /// route name ends up without a value after matching `parts.pathname`
    /// and merging `parts.params`.
    pub fn new(route_name: impl Into<String>, parts: LocationParts) -> Result<Self, LocationError> {
        let route_name = route_name.into();
        let names = param_names(&route_name);

        let mut params = HashMap::new();
        let mut child_path = parts.child_path;

        if let Some(pathname) = &parts.pathname {
            let actual = split_segments(pathname);
            let pattern = split_segments(&route_name);
            if let Some(m) = match_segments(&actual, &pattern) {
                params.extend(m.params);
                if child_path.is_none() {
                    child_path = m
                        .unused
                        .filter(|unused| !unused.is_empty())
                        .map(|unused| unused.join("/"));
                }
            }
        }

        params.extend(parts.params);

        for name in &names {
            if !params.contains_key(name) {
                return Err(LocationError::MissingParam {
                    name: name.clone(),
                    route: route_name,
                });
            }
        }

        let search = match parts.query {
            Some(pairs) => build_query(&pairs),
            None => parts
                .search
                .map(|s| s.trim_start_matches('?').to_string())
                .unwrap_or_default(),
        };
        let hash = parts
            .hash
            .map(|h| h.trim_start_matches('#').to_string())
            .unwrap_or_default();

        Ok(Self {
            route_name,
            params,
            param_names: names,
            search,
            hash,
            child_path,
        })
    }

    /// The route name (pattern) this location belongs to.
    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    /// The parameter values, decoded.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// The `:name` parameters of the route name, in order of appearance.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// The search string without the leading `?`; empty if none.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The hash fragment without the leading `#`; empty if none.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The leftover path a nested navigator consumes, if any.
    pub fn child_path(&self) -> Option<&str> {
        self.child_path.as_deref()
    }

    /// The concrete path of this location, without the child path.
    ///
    /// Parameter values are substituted (encoded) into the route name, and a
    /// trailing catch-all `*` is stripped. No leading slash.
    pub fn pathname(&self) -> String {
        let mut pathname = merge_path_with_params(&self.route_name, &self.params);
        if let Some(stripped) = pathname.strip_suffix('*') {
            pathname = stripped.trim_end_matches('/').to_string();
        }
        pathname
    }

    /// The concrete path including the child path.
    pub fn full_path(&self) -> String {
        let pathname = self.pathname();
        match self.child_path.as_deref() {
            Some(child) if !child.is_empty() => {
                if pathname.is_empty() {
                    child.to_string()
                } else {
                    format!("{pathname}/{child}")
                }
            }
            _ => pathname,
        }
    }

    /// The search string parsed into decoded pairs.
    pub fn query(&self) -> Vec<(String, String)> {
        parse_query(&self.search)
    }

    /// The first query value for `key`, if present.
    pub fn query_get(&self, key: &str) -> Option<String> {
        self.query()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// A copy of this location with a different child path.
    pub fn with_child_path(&self, child_path: Option<String>) -> Self {
        let mut next = self.clone();
        next.child_path = child_path.filter(|p| !p.is_empty());
        next
    }

    /// A copy of this location with a different query.
    pub fn with_query(&self, pairs: &[(String, String)]) -> Self {
        let mut next = self.clone();
        next.search = build_query(pairs);
        next
    }

    /// A copy of this location with a different hash fragment.
    pub fn with_hash(&self, hash: &str) -> Self {
        let mut next = self.clone();
        next.hash = hash.trim_start_matches('#').to_string();
        next
    }
}
