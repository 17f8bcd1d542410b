// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Underpass Stack: a tree of stack navigators for component UIs.
//!
//! Each navigator owns an ordered stack of [`RouteEntry`]s; pushing opens a
//! route on top, popping returns to the one behind. Navigators nest: a route
//! can host a child navigator that consumes the remainder of the URL path,
//! and navigation anywhere in the tree bubbles a fresh URL to the host.
//!
//! The pieces:
//!
//! - [`NavTree`]: the arena that owns every navigator, routes host gestures
//!   to the focused one, and schedules deferred route removal so exit
//!   transitions can play. All operations take the embedder's clock as a
//!   `now` millisecond value; the tree never reads time or spawns timers.
//! - [`RouteTable`]: maps path patterns (`user/:id`, `files/*`) to entry
//!   builders, with deterministic pattern priority.
//! - [`RouteEntry`]: one stack slot, with its own location history, behavior
//!   [`RouteFlags`], and optional [`RouteHooks`] for vetoing navigation.
//! - [`HostHistory`]: the trait the platform glue implements (browser
//!   history, test double).
//! - [`Href`] and [`QueryBinding`]: link resolution and typed query-string
//!   state.
//!
//! ## Example
//!
//! ```rust
//! use underpass_stack::{NavTree, NavigatorOptions, PushOptions, RouteOutcome, RouteTable};
//!
//! let mut table = RouteTable::new();
//! table.insert("", || RouteOutcome::Page("home"));
//! table.insert("user/:id", || RouteOutcome::Page("user"));
//!
//! let mut tree = NavTree::new();
//! let root = tree.insert_root(table, NavigatorOptions::default(), None);
//! tree.initialize(root, 0).unwrap();
//!
//! tree.push_named(root, "user/42", PushOptions::default(), 16)
//!     .unwrap()
//!     .unwrap();
//! let location = tree.current(root).unwrap().location().unwrap();
//! assert_eq!(location.params()["id"], "42");
//!
//! // Popping marks the route deleted; it is physically removed once its
//! // exit transition has had time to play.
//! tree.pop(root, Default::default(), 500).unwrap();
//! assert_eq!(tree.routes(root).len(), 2);
//! tree.flush_removals(1_000);
//! assert_eq!(tree.routes(root).len(), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod host;
mod link;
mod navigator;
mod query_state;
mod route;

pub use host::{HistoryAction, HostHistory, UrlParts};
pub use link::Href;
pub use navigator::{
    NavError, NavTree, NavigatorId, NavigatorOptions, PopOptions, PushOptions, RouteOutcome,
    RouteTable, RouteVisibility, UpdateOptions,
};
pub use query_state::{QueryBinding, WriteMode};
pub use route::{NavAction, NavCheck, RouteEntry, RouteFlags, RouteHooks, RouteKey};

/// Default route transition duration in milliseconds.
///
/// Paces deferred removal for entries that do not override their duration.
pub const DEFAULT_TRANSITION_DURATION: u64 = 180;
