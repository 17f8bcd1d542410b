// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Link targets: turning an href or a named target into navigation.
//!
//! A link rendered inside a navigator is relative to that navigator's
//! position in the tree: [`NavTree::resolve_href`] prefixes the parent's
//! current pathname so the link's displayed URL matches what following it
//! produces, and [`NavTree::push_path`] performs the navigation.

use alloc::string::{String, ToString};
use hashbrown::HashMap;

use underpass_location::merge_path_with_params;

use crate::host::UrlParts;
use crate::navigator::{NavError, NavTree, NavigatorId, PushOptions, join_paths};
use crate::route::{RouteEntry, RouteKey};

/// Where a link points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Href {
    /// A raw `/path?search#hash` href, relative to the navigator.
    Path(String),
    /// A route pattern plus the values to substitute into it.
    Target {
        /// The route pattern, e.g. `user/:id`.
        route_name: String,
        /// Values for the pattern's `:name` parameters.
        params: HashMap<String, String>,
        /// Query string, with or without the leading `?`.
        search: Option<String>,
        /// Hash fragment, with or without the leading `#`.
        hash: Option<String>,
    },
}

impl Href {
    fn parts(&self) -> UrlParts {
        match self {
            Self::Path(raw) => UrlParts::parse(raw),
            Self::Target {
                route_name,
                params,
                search,
                hash,
            } => UrlParts {
                path: merge_path_with_params(route_name, params),
                search: search
                    .as_deref()
                    .map(|s| s.trim_start_matches('?').to_string())
                    .unwrap_or_default(),
                hash: hash
                    .as_deref()
                    .map(|h| h.trim_start_matches('#').to_string())
                    .unwrap_or_default(),
            },
        }
    }
}

impl<P> NavTree<P> {
    /// The absolute href a link in this navigator points at.
    ///
    /// Prefixes the parent navigator's current pathname, so a link to
    /// `detail/5` inside a navigator mounted at `app` renders as
    /// `/app/detail/5`.
    pub fn resolve_href(&self, id: NavigatorId, href: &Href) -> String {
        let prefix = self
            .parent_of(id)
            .and_then(|parent| self.current(parent))
            .and_then(RouteEntry::location)
            .map(|location| location.pathname())
            .unwrap_or_default();
        let parts = href.parts();
        UrlParts {
            path: join_paths(&prefix, &parts.path),
            search: parts.search,
            hash: parts.hash,
        }
        .to_href()
    }

    /// Follow a link: resolve its path through the navigator's route table
    /// and push the matching route.
    pub fn push_path(
        &mut self,
        id: NavigatorId,
        href: &Href,
        replace: bool,
        now: u64,
    ) -> Result<Option<RouteKey>, NavError> {
        let options = |search: String, hash: String| PushOptions {
            search: Some(search),
            hash: Some(hash),
            replace,
            ..PushOptions::default()
        };
        match href {
            Href::Path(_) => {
                let parts = href.parts();
                self.push_named(id, &parts.path, options(parts.search, parts.hash), now)
            }
            Href::Target {
                route_name,
                params,
                search,
                hash,
            } => self.push_named(
                id,
                route_name,
                PushOptions {
                    params: Some(params.clone()),
                    ..options(
                        search.clone().unwrap_or_default(),
                        hash.clone().unwrap_or_default(),
                    )
                },
                now,
            ),
        }
    }
}
