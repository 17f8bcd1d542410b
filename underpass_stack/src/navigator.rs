// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The navigator tree and its stack operations.
//!
//! A [`NavTree`] owns every navigator of an application in a generational
//! slot arena; [`NavigatorId`]s stay cheap to copy and go stale instead of
//! dangling when a navigator is removed. Each navigator holds an ordered
//! stack of [`RouteEntry`]s, a cursor into it, and a [`RouteTable`] that
//! turns paths into entries.
//!
//! ## Stack discipline
//!
//! - `push` mounts a new entry on top, deferred-deleting any forward
//!   entries and, for `replace` pushes, the outgoing one.
//! - `pop` deletes the current entry and lands on the nearest live
//!   predecessor; past the bottom it escalates to the parent navigator, or
//!   asks the host to exit at the root.
//! - `back`/`forward` move the cursor without deleting (unless the entry's
//!   flags say otherwise), first offering the gesture to the entry's own
//!   location history.
//!
//! Deleted entries stay in the stack until their exit transition has had
//! time to play; the embedder drives that by calling
//! [`NavTree::flush_removals`] with its clock.
//!
//! ## URL bubbling
//!
//! Any navigation that changes where a navigator points bubbles the new
//! path up the parent chain: each parent records the child's path as its
//! current location's child path and prepends its own pathname, and the
//! root hands the final URL to the [`HostHistory`]. A navigator created
//! with [`NavigatorOptions::skip_url_update`] stops the bubbling.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter, Result as FmtResult};
use hashbrown::HashMap;

use underpass_location::{
    Location, LocationError, LocationParts, PatternMatch, PatternSet, split_segments,
};
use underpass_transition::{StackSlot, Visibility, compute_visibility};

use crate::host::{HistoryAction, HostHistory};
use crate::route::{NavCheck, RouteEntry, RouteFlags, RouteKey};

/// Failure of a navigation operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// Pushing onto an empty stack needs an explicit route name.
    #[error("push onto an empty stack requires a route name")]
    EmptyStackWithoutName,
    /// No pattern in the navigator's table matches the path.
    #[error("no route matches `{0}`")]
    RouteNotFound(String),
    /// The navigator has no routes yet.
    #[error("navigator is not initialized")]
    NotInitialized,
    /// The id refers to a removed navigator or a reused slot.
    #[error("navigator id is stale")]
    StaleNavigator,
    /// Constructing the target location failed.
    #[error(transparent)]
    Location(#[from] LocationError),
}

/// Identity of one navigator in a [`NavTree`].
///
/// Ids are generational: removing a navigator and reusing its slot bumps
/// the generation, so ids held across the removal read as stale instead of
/// aliasing the new occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NavigatorId(u32, u32);

impl NavigatorId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Per-navigator behavior toggles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigatorOptions {
    /// Do not bubble URL changes to the parent or the host.
    pub skip_url_update: bool,
    /// Navigation in this navigator does not claim the focus that routes
    /// host back/forward gestures.
    pub no_automatic_focus: bool,
    /// Transition duration for entries that do not set their own.
    pub default_transition_duration: Option<u64>,
}

/// Options for [`NavTree::push`] and [`NavTree::push_named`].
#[derive(Clone, Debug)]
pub struct PushOptions {
    /// Parameter values; when absent the current location's are inherited.
    pub params: Option<HashMap<String, String>>,
    /// Decoded query pairs; win over `search`.
    pub query: Option<Vec<(String, String)>>,
    /// Raw search string.
    pub search: Option<String>,
    /// Hash fragment.
    pub hash: Option<String>,
    /// Path for a nested navigator to consume.
    pub child_path: Option<String>,
    /// Remove the outgoing entry instead of keeping it behind the new one.
    pub replace: bool,
    /// Whether the entry's open transition should play. Defaults to `true`.
    pub animated: bool,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            params: None,
            query: None,
            search: None,
            hash: None,
            child_path: None,
            replace: false,
            animated: true,
        }
    }
}

/// Options for [`NavTree::pop`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PopOptions {
    /// Skip the entry's own history and hooks; force the stack operation.
    pub skip_route_check: bool,
}

/// Options for [`NavTree::push_update`] and [`NavTree::update_current`].
///
/// Absent fields keep the current location's values, except `search`, which
/// is dropped when `query` is given.
#[derive(Clone, Debug, Default)]
pub struct UpdateOptions {
    /// Replacement parameter values.
    pub params: Option<HashMap<String, String>>,
    /// Decoded query pairs; win over `search`.
    pub query: Option<Vec<(String, String)>>,
    /// Raw search string.
    pub search: Option<String>,
    /// Hash fragment.
    pub hash: Option<String>,
    /// Path for a nested navigator to consume.
    pub child_path: Option<String>,
}

/// What a route builder produces.
#[derive(Debug)]
pub enum RouteOutcome<P> {
    /// A fully configured entry.
    Route(RouteEntry<P>),
    /// Just a page value, wrapped in an entry with default settings.
    Page(P),
}

type RouteBuilder<P> = Box<dyn Fn() -> RouteOutcome<P>>;

/// Maps route patterns to entry builders.
///
/// Patterns share the priority order of [`PatternSet`], so registration
/// order never decides which route a path resolves to.
pub struct RouteTable<P> {
    patterns: PatternSet,
    builders: HashMap<String, RouteBuilder<P>>,
}

impl<P> RouteTable<P> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            patterns: PatternSet::new(),
            builders: HashMap::new(),
        }
    }

    /// Register a builder for a pattern. A later registration for the same
    /// pattern replaces the earlier one.
    pub fn insert(
        &mut self,
        pattern: impl Into<String>,
        builder: impl Fn() -> RouteOutcome<P> + 'static,
    ) {
        let pattern = pattern.into();
        self.patterns.insert(pattern.clone());
        self.builders.insert(pattern, Box::new(builder));
    }

    /// The registered patterns in priority order.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn resolve(&self, path: &str) -> Option<(PatternMatch, RouteOutcome<P>)> {
        let m = self.patterns.match_path(path)?;
        let builder = self.builders.get(&m.name)?;
        let outcome = builder();
        Some((m, outcome))
    }
}

impl<P> Default for RouteTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Debug for RouteTable<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RouteTable")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

/// Visibility of one stack entry, as reported by [`NavTree::visibilities`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteVisibility {
    /// The entry's key.
    pub key: RouteKey,
    /// The computed visibility.
    pub visibility: Visibility,
    /// Whether this entry is the navigator's current one.
    pub is_current: bool,
    /// Whether the push that mounted the entry was animated.
    pub initial_animated: bool,
}

struct Navigator<P> {
    parent: Option<NavigatorId>,
    children: Vec<NavigatorId>,
    routes: Vec<RouteEntry<P>>,
    current: usize,
    initialized: bool,
    table: RouteTable<P>,
    options: NavigatorOptions,
}

impl<P> Navigator<P> {
    fn current_entry(&self) -> Option<&RouteEntry<P>> {
        if self.initialized {
            self.routes.get(self.current)
        } else {
            None
        }
    }

    fn current_entry_mut(&mut self) -> Option<&mut RouteEntry<P>> {
        if self.initialized {
            self.routes.get_mut(self.current)
        } else {
            None
        }
    }

    fn current_location(&self) -> Option<&Location> {
        self.current_entry().and_then(RouteEntry::location)
    }
}

struct PendingRemoval {
    navigator: NavigatorId,
    key: RouteKey,
    due: u64,
}

/// The navigator tree.
///
/// `P` is the embedder's page type. Times are caller-supplied milliseconds
/// (`now` parameters); the tree never reads a clock.
pub struct NavTree<P> {
    navigators: Vec<Option<Navigator<P>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: Option<NavigatorId>,
    focused: Option<NavigatorId>,
    host: Option<Box<dyn HostHistory>>,
    pending: Vec<PendingRemoval>,
    next_route_key: u64,
    epoch: u64,
}

impl<P> NavTree<P> {
    /// An empty tree with no host.
    pub fn new() -> Self {
        Self {
            navigators: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: None,
            focused: None,
            host: None,
            pending: Vec::new(),
            next_route_key: 1,
            epoch: 0,
        }
    }

    /// Create the root navigator, optionally wiring up a host history.
    ///
    /// The root receives the initial focus. A second call makes the new
    /// navigator the root reference; the old one stays alive but detached.
    pub fn insert_root(
        &mut self,
        table: RouteTable<P>,
        options: NavigatorOptions,
        host: Option<Box<dyn HostHistory>>,
    ) -> NavigatorId {
        let id = self.alloc(Navigator {
            parent: None,
            children: Vec::new(),
            routes: Vec::new(),
            current: 0,
            initialized: false,
            table,
            options,
        });
        self.root = Some(id);
        self.focused = Some(id);
        if host.is_some() {
            self.host = host;
        }
        id
    }

    /// Create a navigator nested under `parent`.
    pub fn insert_child(
        &mut self,
        parent: NavigatorId,
        table: RouteTable<P>,
        options: NavigatorOptions,
    ) -> Result<NavigatorId, NavError> {
        if self.nav(parent).is_none() {
            return Err(NavError::StaleNavigator);
        }
        let id = self.alloc(Navigator {
            parent: Some(parent),
            children: Vec::new(),
            routes: Vec::new(),
            current: 0,
            initialized: false,
            table,
            options,
        });
        if let Some(parent_nav) = self.nav_mut(parent) {
            parent_nav.children.push(id);
        }
        Ok(id)
    }

    /// Remove a navigator and its whole subtree. Stale ids are ignored.
    pub fn remove(&mut self, id: NavigatorId) {
        let Some(parent) = self.nav(id).map(|nav| nav.parent) else {
            return;
        };
        if let Some(parent_nav) = parent.and_then(|parent| self.nav_mut(parent)) {
            parent_nav.children.retain(|child| *child != id);
        }
        self.remove_subtree(id);
        if self.root == Some(id) {
            self.root = None;
        }
        if self.focused.is_some_and(|focused| self.nav(focused).is_none()) {
            self.focused = self.root;
        }
        self.epoch += 1;
    }

    fn remove_subtree(&mut self, id: NavigatorId) {
        let Some(children) = self.nav(id).map(|nav| nav.children.clone()) else {
            return;
        };
        for child in children {
            self.remove_subtree(child);
        }
        self.navigators[id.idx()] = None;
        self.free_list.push(id.idx());
        self.pending.retain(|pending| pending.navigator != id);
    }

    /// Whether the id refers to a live navigator.
    pub fn is_alive(&self, id: NavigatorId) -> bool {
        self.nav(id).is_some()
    }

    /// The root navigator, if one exists.
    pub fn root(&self) -> Option<NavigatorId> {
        self.root.filter(|root| self.nav(*root).is_some())
    }

    /// The parent of a navigator.
    pub fn parent_of(&self, id: NavigatorId) -> Option<NavigatorId> {
        self.nav(id).and_then(|nav| nav.parent)
    }

    /// The nested navigators of a navigator. Empty for stale ids.
    pub fn children_of(&self, id: NavigatorId) -> &[NavigatorId] {
        self.nav(id).map_or(&[], |nav| nav.children.as_slice())
    }

    /// The navigator's stack, oldest first. Empty for stale ids.
    pub fn routes(&self, id: NavigatorId) -> &[RouteEntry<P>] {
        self.nav(id).map_or(&[], |nav| nav.routes.as_slice())
    }

    /// The current entry of a navigator.
    pub fn current(&self, id: NavigatorId) -> Option<&RouteEntry<P>> {
        self.nav(id).and_then(Navigator::current_entry)
    }

    /// The index of the current entry.
    pub fn current_index(&self, id: NavigatorId) -> Option<usize> {
        self.nav(id).filter(|nav| nav.initialized).map(|nav| nav.current)
    }

    /// Whether the navigator has mounted its first route.
    pub fn is_initialized(&self, id: NavigatorId) -> bool {
        self.nav(id).is_some_and(|nav| nav.initialized)
    }

    /// Look up a stack entry by key.
    pub fn route(&self, id: NavigatorId, key: RouteKey) -> Option<&RouteEntry<P>> {
        self.nav(id)
            .and_then(|nav| nav.routes.iter().find(|route| route.key() == key))
    }

    /// Mutable access to a stack entry.
    pub fn route_mut(&mut self, id: NavigatorId, key: RouteKey) -> Option<&mut RouteEntry<P>> {
        self.nav_mut(id)
            .and_then(|nav| nav.routes.iter_mut().find(|route| route.key() == key))
    }

    /// A counter that bumps whenever observable state changes. Embedders
    /// compare epochs to decide when to re-render.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Mount the navigator's first route from the current URL.
    ///
    /// The root resolves the host URL's path; a nested navigator resolves
    /// the child path its parent's current location carries. The initial
    /// push is never animated. Does nothing on an already initialized
    /// navigator.
    pub fn initialize(&mut self, id: NavigatorId, now: u64) -> Result<(), NavError> {
        let (initialized, parent) = {
            let nav = self.nav(id).ok_or(NavError::StaleNavigator)?;
            (nav.initialized, nav.parent)
        };
        if initialized {
            return Ok(());
        }
        let host_url = self.host.as_deref().map(HostHistory::url).unwrap_or_default();
        let path = match parent {
            None => host_url.path,
            Some(parent) => self
                .nav(parent)
                .and_then(Navigator::current_location)
                .and_then(|location| location.child_path().map(String::from))
                .unwrap_or_default(),
        };
        let options = PushOptions {
            search: Some(host_url.search),
            hash: Some(host_url.hash),
            animated: false,
            ..PushOptions::default()
        };
        self.push_named(id, &path, options, now)?;
        log::debug!("navigator {id:?}: initialized at `{path}`");
        Ok(())
    }

    /// Push an explicit entry onto the navigator's stack.
    ///
    /// `route_name` may be omitted when the stack already has a current
    /// entry, in which case its route name (and, unless overridden, its
    /// params) are reused. Returns the new entry's key, or `Ok(None)` when
    /// the outgoing entry vetoed the push.
    pub fn push(
        &mut self,
        id: NavigatorId,
        entry: RouteEntry<P>,
        route_name: Option<&str>,
        options: PushOptions,
        now: u64,
    ) -> Result<Option<RouteKey>, NavError> {
        let PushOptions {
            params,
            query,
            search,
            hash,
            child_path,
            replace,
            animated,
        } = options;
        let (name, inherited) = {
            let nav = self.nav(id).ok_or(NavError::StaleNavigator)?;
            let current = nav.current_location();
            let name = match route_name {
                Some(name) => name.to_string(),
                None => current
                    .map(|location| location.route_name().to_string())
                    .ok_or(NavError::EmptyStackWithoutName)?,
            };
            let inherited = current.map(|location| location.params().clone());
            (name, inherited)
        };
        let location = Location::new(
            name,
            LocationParts {
                pathname: None,
                params: params.or(inherited).unwrap_or_default(),
                query,
                search,
                hash,
                child_path,
            },
        )?;
        self.push_located(id, entry, location, replace, animated, now)
    }

    /// Resolve a path (or a route name) through the navigator's table and
    /// push the entry its builder produces.
    ///
    /// Path parameters captured by the pattern merge with explicit
    /// `options.params` (explicit values win); segments swallowed by a
    /// trailing `*` become the child path unless one is given.
    pub fn push_named(
        &mut self,
        id: NavigatorId,
        path: &str,
        options: PushOptions,
        now: u64,
    ) -> Result<Option<RouteKey>, NavError> {
        let PushOptions {
            params,
            query,
            search,
            hash,
            child_path,
            replace,
            animated,
        } = options;
        let (m, outcome) = {
            let nav = self.nav(id).ok_or(NavError::StaleNavigator)?;
            nav.table
                .resolve(path)
                .ok_or_else(|| NavError::RouteNotFound(path.to_string()))?
        };
        let entry = match outcome {
            RouteOutcome::Route(entry) => entry,
            RouteOutcome::Page(page) => RouteEntry::new(page),
        };
        let mut merged = m.params;
        if let Some(explicit) = params {
            merged.extend(explicit);
        }
        let child_path = child_path.or_else(|| {
            m.unused
                .filter(|unused| !unused.is_empty())
                .map(|unused| unused.join("/"))
        });
        let location = Location::new(
            m.name,
            LocationParts {
                pathname: None,
                params: merged,
                query,
                search,
                hash,
                child_path,
            },
        )?;
        self.push_located(id, entry, location, replace, animated, now)
    }

    fn push_located(
        &mut self,
        id: NavigatorId,
        mut entry: RouteEntry<P>,
        location: Location,
        replace: bool,
        animated: bool,
        now: u64,
    ) -> Result<Option<RouteKey>, NavError> {
        {
            let nav = self.nav_mut(id).ok_or(NavError::StaleNavigator)?;
            if let Some(current) = nav.current_entry_mut() {
                if !current.will_push_new_route() {
                    return Ok(None);
                }
            }
            if let Some(millis) = nav.options.default_transition_duration {
                entry.inherit_transition_duration(millis);
            }
        }

        let full_path = location.full_path();
        let search = location.search().to_string();
        let hash = location.hash().to_string();

        let key = RouteKey(self.next_route_key);
        self.next_route_key += 1;
        entry.mount(key, location, animated);

        let (first_push, to_delete) = {
            let nav = self.nav_mut(id).ok_or(NavError::StaleNavigator)?;
            let first_push = !nav.initialized;
            let mut to_delete = Vec::new();
            if let Some(current) = nav.current_entry() {
                for route in &nav.routes[nav.current + 1..] {
                    if !route.is_deleted() {
                        to_delete.push(route.key());
                    }
                }
                if replace || current.flags().contains(RouteFlags::REMOVE_ON_PUSH) {
                    to_delete.push(current.key());
                }
            }
            nav.routes.push(entry);
            nav.current = nav.routes.len() - 1;
            nav.initialized = true;
            (first_push, to_delete)
        };

        for stale in to_delete {
            self.delete_route(id, stale, now)?;
        }
        self.conditional_focus(id);
        log::debug!("navigator {id:?}: push `{full_path}` as {key:?}");

        if first_push {
            // The initial route restores the URL rather than producing a
            // new one; still tell the parent which path this navigator
            // consumed.
            self.record_child_path(id, &full_path);
            self.epoch += 1;
        } else {
            self.sync_url(id, Some(full_path), search, hash);
        }
        Ok(Some(key))
    }

    /// Pop the current entry off the stack.
    ///
    /// The gesture is first offered to the entry's own history and hooks
    /// (unless `skip_route_check`). With no live predecessor the pop
    /// escalates: a nested navigator forwards it as `back` to its parent,
    /// the root asks the host to exit.
    pub fn pop(&mut self, id: NavigatorId, options: PopOptions, now: u64) -> Result<(), NavError> {
        let check = {
            let nav = self.nav_mut(id).ok_or(NavError::StaleNavigator)?;
            let current = nav.current_entry_mut().ok_or(NavError::NotInitialized)?;
            if options.skip_route_check {
                NavCheck::Proceed
            } else {
                current.will_back()
            }
        };
        match check {
            NavCheck::Veto => return Ok(()),
            NavCheck::MovedWithin => {
                self.sync_current(id);
                return Ok(());
            }
            NavCheck::Proceed => {}
        }

        let (previous, parent, current_key) = {
            let nav = self.nav(id).ok_or(NavError::StaleNavigator)?;
            let current = nav.current_entry().ok_or(NavError::NotInitialized)?;
            (
                previous_live(&nav.routes, nav.current),
                nav.parent,
                current.key(),
            )
        };

        let Some(previous) = previous else {
            return match parent {
                Some(parent) => self.back(parent, now),
                None => {
                    log::debug!("navigator {id:?}: pop past the last route; exiting");
                    if let Some(host) = self.host.as_deref_mut() {
                        host.exit();
                    }
                    Ok(())
                }
            };
        };

        self.delete_route(id, current_key, now)?;
        if let Some(nav) = self.nav_mut(id) {
            nav.current = previous;
        }
        self.conditional_focus(id);
        self.sync_current(id);
        log::debug!("navigator {id:?}: pop to index {previous}");
        Ok(())
    }

    /// Step back without removing the current entry, so `forward` can
    /// return to it. Entries flagged [`RouteFlags::POP_ON_BACK`] pop
    /// instead. Escalates like [`pop`](Self::pop) at the bottom.
    pub fn back(&mut self, id: NavigatorId, now: u64) -> Result<(), NavError> {
        let pops = {
            let nav = self.nav(id).ok_or(NavError::StaleNavigator)?;
            let current = nav.current_entry().ok_or(NavError::NotInitialized)?;
            current.flags().contains(RouteFlags::POP_ON_BACK)
        };
        if pops {
            return self.pop(id, PopOptions::default(), now);
        }

        let check = {
            let nav = self.nav_mut(id).ok_or(NavError::StaleNavigator)?;
            match nav.current_entry_mut() {
                Some(current) => current.will_back(),
                None => return Err(NavError::NotInitialized),
            }
        };
        match check {
            NavCheck::Veto => return Ok(()),
            NavCheck::MovedWithin => {
                self.sync_current(id);
                return Ok(());
            }
            NavCheck::Proceed => {}
        }

        let (previous, parent) = {
            let nav = self.nav(id).ok_or(NavError::StaleNavigator)?;
            (previous_live(&nav.routes, nav.current), nav.parent)
        };
        let Some(previous) = previous else {
            return match parent {
                Some(parent) => self.back(parent, now),
                None => {
                    if let Some(host) = self.host.as_deref_mut() {
                        host.exit();
                    }
                    Ok(())
                }
            };
        };
        if let Some(nav) = self.nav_mut(id) {
            nav.current = previous;
        }
        self.conditional_focus(id);
        self.sync_current(id);
        log::debug!("navigator {id:?}: back to index {previous}");
        Ok(())
    }

    /// Step forward to the nearest live successor.
    ///
    /// Entries flagged [`RouteFlags::REMOVE_ON_FORWARD`] are deleted on
    /// the way out. With no successor a nested navigator escalates to its
    /// parent; the root does nothing.
    pub fn forward(&mut self, id: NavigatorId, now: u64) -> Result<(), NavError> {
        let check = {
            let nav = self.nav_mut(id).ok_or(NavError::StaleNavigator)?;
            match nav.current_entry_mut() {
                Some(current) => current.will_forward(),
                None => return Err(NavError::NotInitialized),
            }
        };
        match check {
            NavCheck::Veto => return Ok(()),
            NavCheck::MovedWithin => {
                self.sync_current(id);
                return Ok(());
            }
            NavCheck::Proceed => {}
        }

        let (next, parent, current_key, removes) = {
            let nav = self.nav(id).ok_or(NavError::StaleNavigator)?;
            let current = nav.current_entry().ok_or(NavError::NotInitialized)?;
            (
                next_live(&nav.routes, nav.current),
                nav.parent,
                current.key(),
                current.flags().contains(RouteFlags::REMOVE_ON_FORWARD),
            )
        };
        let Some(next) = next else {
            return match parent {
                Some(parent) => self.forward(parent, now),
                None => Ok(()),
            };
        };
        if let Some(nav) = self.nav_mut(id) {
            nav.current = next;
        }
        if removes {
            self.delete_route(id, current_key, now)?;
        }
        self.conditional_focus(id);
        self.sync_current(id);
        log::debug!("navigator {id:?}: forward to index {next}");
        Ok(())
    }

    /// Mark an entry deleted.
    ///
    /// The entry stays in the stack (reported as closed) until the physical
    /// removal, scheduled after the entry's transition duration so its exit
    /// animation can play; a zero duration removes it immediately. Unknown
    /// keys and already deleted entries are ignored.
    pub fn delete_route(
        &mut self,
        id: NavigatorId,
        key: RouteKey,
        now: u64,
    ) -> Result<(), NavError> {
        let duration = {
            let nav = self.nav_mut(id).ok_or(NavError::StaleNavigator)?;
            let Some(entry) = nav.routes.iter_mut().find(|route| route.key() == key) else {
                return Ok(());
            };
            if entry.is_deleted() {
                return Ok(());
            }
            entry.mark_deleted();
            entry.transition_duration()
        };
        if duration == 0 {
            self.remove_route_now(id, key);
        } else {
            self.pending.push(PendingRemoval {
                navigator: id,
                key,
                due: now.saturating_add(duration),
            });
        }
        self.epoch += 1;
        log::trace!("navigator {id:?}: delete {key:?} (removal in {duration}ms)");
        Ok(())
    }

    /// Physically remove deleted entries whose transition time has passed.
    /// Returns how many entries were removed.
    pub fn flush_removals(&mut self, now: u64) -> usize {
        let mut kept = Vec::new();
        let mut removed = 0;
        for pending in core::mem::take(&mut self.pending) {
            if pending.due <= now {
                if self.remove_route_now(pending.navigator, pending.key) {
                    removed += 1;
                }
            } else if self.is_alive(pending.navigator) {
                kept.push(pending);
            }
        }
        self.pending = kept;
        if removed > 0 {
            self.epoch += 1;
            log::trace!("flushed {removed} removals");
        }
        removed
    }

    /// How many removals are scheduled but not yet flushed.
    pub fn pending_removals(&self) -> usize {
        self.pending.len()
    }

    fn remove_route_now(&mut self, id: NavigatorId, key: RouteKey) -> bool {
        let Some(nav) = self.nav_mut(id) else {
            return false;
        };
        let Some(position) = nav.routes.iter().position(|route| route.key() == key) else {
            return false;
        };
        nav.routes.remove(position);
        if position < nav.current {
            nav.current -= 1;
        } else if nav.current >= nav.routes.len() && nav.current > 0 {
            nav.current = nav.routes.len() - 1;
        }
        true
    }

    /// Push a new location onto the current entry's own history.
    ///
    /// Returns whether the entry accepted it.
    pub fn push_update(&mut self, id: NavigatorId, options: UpdateOptions) -> Result<bool, NavError> {
        self.apply_update(id, options, false)
    }

    /// Replace the current entry's location in place, without growing its
    /// history. Returns whether the entry accepted it.
    pub fn update_current(
        &mut self,
        id: NavigatorId,
        options: UpdateOptions,
    ) -> Result<bool, NavError> {
        self.apply_update(id, options, true)
    }

    fn apply_update(
        &mut self,
        id: NavigatorId,
        options: UpdateOptions,
        in_place: bool,
    ) -> Result<bool, NavError> {
        let UpdateOptions {
            params,
            query,
            search,
            hash,
            child_path,
        } = options;
        let next = {
            let nav = self.nav(id).ok_or(NavError::StaleNavigator)?;
            let location = nav.current_location().ok_or(NavError::NotInitialized)?;
            let search = if query.is_some() {
                None
            } else {
                search.or_else(|| Some(location.search().to_string()))
            };
            Location::new(
                location.route_name().to_string(),
                LocationParts {
                    pathname: None,
                    params: params.unwrap_or_else(|| location.params().clone()),
                    query,
                    search,
                    hash: hash.or_else(|| Some(location.hash().to_string())),
                    child_path: child_path.or_else(|| location.child_path().map(String::from)),
                },
            )?
        };
        let accepted = {
            let nav = self.nav_mut(id).ok_or(NavError::StaleNavigator)?;
            let current = nav.current_entry_mut().ok_or(NavError::NotInitialized)?;
            if in_place {
                current.update(next)
            } else {
                current.push_update(next)
            }
        };
        if accepted {
            self.sync_current(id);
            log::trace!("navigator {id:?}: location updated (in_place: {in_place})");
        }
        Ok(accepted)
    }

    /// Route a host gesture to the focused navigator.
    pub fn handle_history_action(
        &mut self,
        action: HistoryAction,
        now: u64,
    ) -> Result<(), NavError> {
        let Some(target) = self.focused_navigator() else {
            return Ok(());
        };
        match action {
            HistoryAction::Back => self.back(target, now),
            HistoryAction::Forward => self.forward(target, now),
            HistoryAction::HashChange(hash) => {
                let search = {
                    let nav = self.nav_mut(target).ok_or(NavError::StaleNavigator)?;
                    let current = nav.current_entry_mut().ok_or(NavError::NotInitialized)?;
                    current.set_hash(&hash);
                    current
                        .location()
                        .map(|location| location.search().to_string())
                        .unwrap_or_default()
                };
                self.sync_url(target, None, search, hash);
                Ok(())
            }
        }
    }

    /// Make the host's forward gesture available.
    pub fn enable_forward_button(&mut self) {
        if let Some(host) = self.host.as_deref_mut() {
            host.enable_forward_button();
        }
    }

    /// Give a navigator the focus that routes host gestures.
    pub fn focus(&mut self, id: NavigatorId) {
        if self.nav(id).is_some() {
            self.focused = Some(id);
        }
    }

    /// Return the focus to the root.
    pub fn blur(&mut self) {
        self.focused = self.root;
    }

    /// The navigator host gestures are routed to: the focused one, falling
    /// back to the root when the focused navigator is gone.
    pub fn focused_navigator(&self) -> Option<NavigatorId> {
        self.focused
            .filter(|id| self.nav(*id).is_some())
            .or(self.root)
            .filter(|id| self.nav(*id).is_some())
    }

    /// Whether host gestures currently go to this navigator.
    pub fn is_focused(&self, id: NavigatorId) -> bool {
        self.focused_navigator() == Some(id)
    }

    fn conditional_focus(&mut self, id: NavigatorId) {
        let opted_out = self
            .nav(id)
            .is_some_and(|nav| nav.options.no_automatic_focus);
        if !opted_out {
            self.focus(id);
        }
    }

    /// Per-entry visibility of a navigator's stack, in stack order.
    pub fn visibilities(&self, id: NavigatorId) -> Vec<RouteVisibility> {
        let Some(nav) = self.nav(id) else {
            return Vec::new();
        };
        if !nav.initialized {
            return Vec::new();
        }
        let slots: Vec<StackSlot> = nav
            .routes
            .iter()
            .map(|route| StackSlot {
                deleted: route.is_deleted(),
                opaque: route.flags().contains(RouteFlags::OPAQUE),
            })
            .collect();
        nav.routes
            .iter()
            .zip(compute_visibility(&slots, nav.current))
            .enumerate()
            .map(|(i, (route, visibility))| RouteVisibility {
                key: route.key(),
                visibility,
                is_current: i == nav.current,
                initial_animated: route.initial_animated(),
            })
            .collect()
    }

    /// Bubble the navigator's current location up to the host URL.
    fn sync_current(&mut self, id: NavigatorId) {
        let location = self
            .nav(id)
            .and_then(Navigator::current_location)
            .cloned();
        if let Some(location) = location {
            self.sync_url(
                id,
                Some(location.full_path()),
                location.search().to_string(),
                location.hash().to_string(),
            );
        }
    }

    fn record_child_path(&mut self, id: NavigatorId, full_path: &str) {
        let Some(parent) = self.nav(id).and_then(|nav| nav.parent) else {
            return;
        };
        if let Some(parent_nav) = self.nav_mut(parent) {
            if let Some(entry) = parent_nav.current_entry_mut() {
                let path = (!full_path.is_empty()).then(|| full_path.to_string());
                entry.set_child_path(path);
            }
        }
    }

    fn sync_url(&mut self, id: NavigatorId, path: Option<String>, search: String, hash: String) {
        let mut cursor = id;
        let mut path = path;
        loop {
            let Some((skip, parent)) = self
                .nav(cursor)
                .map(|nav| (nav.options.skip_url_update, nav.parent))
            else {
                break;
            };
            if skip {
                break;
            }
            match parent {
                Some(parent) => {
                    if let Some(p) = path.take() {
                        let prefix = self
                            .nav(parent)
                            .and_then(Navigator::current_location)
                            .map(Location::pathname)
                            .unwrap_or_default();
                        self.record_child_path(cursor, &p);
                        path = Some(join_paths(&prefix, &p));
                    }
                    cursor = parent;
                }
                None => {
                    if let Some(host) = self.host.as_deref_mut() {
                        let mut url = host.url();
                        if let Some(p) = path.take() {
                            url.path = p;
                        }
                        url.search = search;
                        url.hash = hash;
                        host.set_url(&url);
                    }
                    break;
                }
            }
        }
        self.epoch += 1;
    }

    fn nav(&self, id: NavigatorId) -> Option<&Navigator<P>> {
        if self.generations.get(id.idx()) != Some(&id.1) {
            return None;
        }
        self.navigators.get(id.idx()).and_then(Option::as_ref)
    }

    fn nav_mut(&mut self, id: NavigatorId) -> Option<&mut Navigator<P>> {
        if self.generations.get(id.idx()) != Some(&id.1) {
            return None;
        }
        self.navigators.get_mut(id.idx()).and_then(Option::as_mut)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "more than u32::MAX live navigators is not supported"
    )]
    fn alloc(&mut self, nav: Navigator<P>) -> NavigatorId {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].wrapping_add(1);
            self.generations[idx] = generation;
            self.navigators[idx] = Some(nav);
            NavigatorId::new(idx as u32, generation)
        } else {
            let idx = self.navigators.len();
            self.navigators.push(Some(nav));
            self.generations.push(0);
            NavigatorId::new(idx as u32, 0)
        }
    }
}

impl<P> Default for NavTree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Debug for NavTree<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NavTree")
            .field(
                "alive",
                &self.navigators.iter().filter(|nav| nav.is_some()).count(),
            )
            .field("root", &self.root)
            .field("focused", &self.focused)
            .field("pending_removals", &self.pending.len())
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

fn previous_live<P>(routes: &[RouteEntry<P>], current: usize) -> Option<usize> {
    routes[..current.min(routes.len())]
        .iter()
        .rposition(|route| !route.is_deleted())
}

fn next_live<P>(routes: &[RouteEntry<P>], current: usize) -> Option<usize> {
    let start = (current + 1).min(routes.len());
    routes[start..]
        .iter()
        .position(|route| !route.is_deleted())
        .map(|offset| start + offset)
}

/// Concatenate two paths segment-wise, normalizing slashes.
pub(crate) fn join_paths(prefix: &str, path: &str) -> String {
    let mut segments: smallvec::SmallVec<[&str; 8]> = split_segments(prefix);
    segments.extend(split_segments(path));
    segments.join("/")
}
