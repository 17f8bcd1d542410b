// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Route entries: one stack slot with its own location history.
//!
//! A [`RouteEntry`] pairs the embedder's page value with everything the
//! navigator tracks per slot: a history of [`Location`]s with a cursor,
//! behavioral [`RouteFlags`], the transition duration that paces deferred
//! removal, and optional [`RouteHooks`] that can veto navigation.
//!
//! Back and forward first try to move the cursor within the entry's own
//! history; only when the cursor is already at the edge does the gesture
//! escalate to a stack operation. [`NavCheck`] carries that three-way
//! outcome.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter, Result as FmtResult};

use underpass_location::Location;
use underpass_transition::AnimationVariant;

use crate::DEFAULT_TRANSITION_DURATION;

bitflags::bitflags! {
    /// Per-route behavior toggles.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RouteFlags: u8 {
        /// A back gesture pops this entry instead of stepping behind it,
        /// so it cannot be returned to with forward.
        const POP_ON_BACK = 1 << 0;
        /// Pushing another route over this entry removes it.
        const REMOVE_ON_PUSH = 1 << 1;
        /// Moving forward past this entry removes it.
        const REMOVE_ON_FORWARD = 1 << 2;
        /// The entry fully covers routes behind it, so they can be hidden.
        const OPAQUE = 1 << 3;
    }
}

impl Default for RouteFlags {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Outcome of offering a back or forward gesture to a route entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavCheck {
    /// The entry has nothing left to do; the navigator proceeds with the
    /// stack operation.
    Proceed,
    /// The entry moved within its own history; no stack change is needed.
    MovedWithin,
    /// The entry refused the gesture; nothing happens.
    Veto,
}

/// The navigation event a route entry just went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    /// The entry was pushed onto a stack.
    Pushed,
    /// A back gesture reached the entry.
    Back,
    /// A forward gesture reached the entry.
    Forward,
    /// A location was pushed onto the entry's own history.
    PushUpdate,
    /// The entry's current location was replaced in place.
    Update,
}

/// Embedder callbacks on one route entry.
///
/// The `will_*` methods run before the corresponding operation and veto it
/// by returning `false`; the defaults allow everything. [`on_navigate`]
/// fires after an operation went through.
///
/// [`on_navigate`]: RouteHooks::on_navigate
pub trait RouteHooks {
    /// About to step back from `current`. Return `false` to veto.
    fn will_back(&mut self, current: &Location) -> bool {
        let _ = current;
        true
    }

    /// About to step forward from `current`. Return `false` to veto.
    fn will_forward(&mut self, current: &Location) -> bool {
        let _ = current;
        true
    }

    /// About to push `next` onto the entry's history. Return `false` to veto.
    fn will_push_update(&mut self, next: &Location) -> bool {
        let _ = next;
        true
    }

    /// About to replace the current location with `next`. Return `false` to
    /// veto.
    fn will_update(&mut self, next: &Location) -> bool {
        let _ = next;
        true
    }

    /// About to have another route pushed on top. Return `false` to veto.
    fn will_push_new_route(&mut self) -> bool {
        true
    }

    /// A navigation event went through on this entry.
    fn on_navigate(&mut self, action: NavAction) {
        let _ = action;
    }
}

/// Identity of a route entry, unique within one navigator tree.
///
/// Keys survive stack reordering and deferred removal, so embedders can use
/// them to key rendered elements and transition state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey(pub(crate) u64);

impl RouteKey {
    /// The raw key value.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// One slot of a navigator's stack.
///
/// `P` is the embedder's page type; the navigator never looks inside it.
pub struct RouteEntry<P> {
    page: P,
    key: RouteKey,
    history: Vec<Location>,
    index: usize,
    deleted: bool,
    initial_animated: bool,
    flags: RouteFlags,
    variant: AnimationVariant,
    transition_duration: Option<u64>,
    history_depth: Option<usize>,
    hooks: Option<Box<dyn RouteHooks>>,
}

impl<P> RouteEntry<P> {
    /// An entry with default settings: opaque, default transition, no
    /// history cap, no hooks.
    pub fn new(page: P) -> Self {
        Self {
            page,
            key: RouteKey(0),
            history: Vec::new(),
            index: 0,
            deleted: false,
            initial_animated: false,
            flags: RouteFlags::default(),
            variant: AnimationVariant::default(),
            transition_duration: None,
            history_depth: None,
            hooks: None,
        }
    }

    /// Replace the behavior flags.
    pub fn with_flags(mut self, flags: RouteFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the animation variant.
    pub fn with_variant(mut self, variant: AnimationVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the transition duration in milliseconds. Zero makes removal
    /// immediate instead of deferred.
    pub fn with_transition_duration(mut self, millis: u64) -> Self {
        self.transition_duration = Some(millis);
        self
    }

    /// Cap the entry's own history to the newest `depth` locations.
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = Some(depth);
        self
    }

    /// Attach embedder hooks.
    pub fn with_hooks(mut self, hooks: impl RouteHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// The embedder's page value.
    pub fn page(&self) -> &P {
        &self.page
    }

    /// Mutable access to the page value.
    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    /// The entry's key. Zero until the entry is pushed onto a stack.
    pub fn key(&self) -> RouteKey {
        self.key
    }

    /// The current location; `None` until the entry is pushed.
    pub fn location(&self) -> Option<&Location> {
        self.history.get(self.index)
    }

    /// The entry's own location history, oldest first.
    pub fn history(&self) -> &[Location] {
        &self.history
    }

    /// The cursor into [`history`](Self::history).
    pub fn history_index(&self) -> usize {
        self.index
    }

    /// Whether the entry is marked deleted and awaiting removal.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// The behavior flags.
    pub fn flags(&self) -> RouteFlags {
        self.flags
    }

    /// The animation variant.
    pub fn variant(&self) -> AnimationVariant {
        self.variant
    }

    /// The transition duration in milliseconds: the entry's own value, or
    /// the navigator/crate default.
    pub fn transition_duration(&self) -> u64 {
        self.transition_duration
            .unwrap_or(DEFAULT_TRANSITION_DURATION)
    }

    /// The navigator's default duration; only applies when the entry does
    /// not set its own.
    pub(crate) fn inherit_transition_duration(&mut self, millis: u64) {
        self.transition_duration.get_or_insert(millis);
    }

    /// Whether the push that mounted this entry was animated.
    pub fn initial_animated(&self) -> bool {
        self.initial_animated
    }

    fn notify(&mut self, action: NavAction) {
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_navigate(action);
        }
    }

    /// Give the entry its key and initial location when it enters a stack.
    pub(crate) fn mount(&mut self, key: RouteKey, location: Location, animated: bool) {
        self.key = key;
        self.history.clear();
        self.history.push(location);
        self.index = 0;
        self.initial_animated = animated;
        self.notify(NavAction::Pushed);
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Whether a new route may be pushed on top of this entry.
    pub(crate) fn will_push_new_route(&mut self) -> bool {
        match self.hooks.as_mut() {
            Some(hooks) => hooks.will_push_new_route(),
            None => true,
        }
    }

    /// Offer a back gesture to the entry.
    pub(crate) fn will_back(&mut self) -> NavCheck {
        if self.deleted {
            return NavCheck::Veto;
        }
        let Some(current) = self.history.get(self.index).cloned() else {
            return NavCheck::Veto;
        };
        if let Some(hooks) = self.hooks.as_mut() {
            if !hooks.will_back(&current) {
                return NavCheck::Veto;
            }
        }
        if self.index > 0 {
            self.index -= 1;
            self.notify(NavAction::Back);
            NavCheck::MovedWithin
        } else {
            self.notify(NavAction::Back);
            NavCheck::Proceed
        }
    }

    /// Offer a forward gesture to the entry.
    pub(crate) fn will_forward(&mut self) -> NavCheck {
        if self.deleted {
            return NavCheck::Veto;
        }
        let Some(current) = self.history.get(self.index).cloned() else {
            return NavCheck::Veto;
        };
        if let Some(hooks) = self.hooks.as_mut() {
            if !hooks.will_forward(&current) {
                return NavCheck::Veto;
            }
        }
        if self.index + 1 < self.history.len() {
            self.index += 1;
            self.notify(NavAction::Forward);
            NavCheck::MovedWithin
        } else {
            self.notify(NavAction::Forward);
            NavCheck::Proceed
        }
    }

    /// Push a location onto the entry's history, truncating any forward
    /// locations. Returns `false` if the hooks vetoed.
    pub(crate) fn push_update(&mut self, location: Location) -> bool {
        if self.deleted {
            return false;
        }
        if let Some(hooks) = self.hooks.as_mut() {
            if !hooks.will_push_update(&location) {
                return false;
            }
        }
        self.history.truncate(self.index + 1);
        self.history.push(location);
        self.index += 1;
        if let Some(depth) = self.history_depth.filter(|depth| *depth > 0) {
            while self.history.len() > depth {
                self.history.remove(0);
                self.index = self.index.saturating_sub(1);
            }
        }
        self.notify(NavAction::PushUpdate);
        true
    }

    /// Replace the current location in place. Returns `false` if the hooks
    /// vetoed.
    pub(crate) fn update(&mut self, location: Location) -> bool {
        if self.deleted || self.index >= self.history.len() {
            return false;
        }
        if let Some(hooks) = self.hooks.as_mut() {
            if !hooks.will_update(&location) {
                return false;
            }
        }
        self.history[self.index] = location;
        self.notify(NavAction::Update);
        true
    }

    /// Record the path a nested navigator consumed, without hooks or
    /// history movement.
    pub(crate) fn set_child_path(&mut self, child_path: Option<String>) {
        if let Some(location) = self.history.get_mut(self.index) {
            *location = location.with_child_path(child_path);
        }
    }

    /// Replace the current location's hash fragment in place.
    pub(crate) fn set_hash(&mut self, hash: &str) {
        if let Some(location) = self.history.get_mut(self.index) {
            *location = location.with_hash(hash);
        }
    }
}

impl<P: Debug> Debug for RouteEntry<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RouteEntry")
            .field("page", &self.page)
            .field("key", &self.key)
            .field("index", &self.index)
            .field("history_len", &self.history.len())
            .field("deleted", &self.deleted)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
