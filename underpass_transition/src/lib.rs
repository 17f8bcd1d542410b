// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Underpass Transition: stack visibility and route transition state.
//!
//! This crate turns a navigation stack into per-route display decisions. It
//! has two halves:
//!
//! - [`compute_visibility`]: a pure projection from stack order and opacity
//!   to a [`Visibility`] per route. Routes above the current one are closed,
//!   routes below are hidden unless a run of transparent routes makes them
//!   show through, and deleted routes are always closed.
//! - [`TransitionState`]: a small per-route state machine that observes
//!   visibility changes and says what the host should do: show the element,
//!   play an enter/exit animation, or hide it once an animation completes.
//!   Every observation bumps a cycle counter and completions carry the cycle
//!   they belong to, so a completion that arrives after a newer transition
//!   has started is ignored (last writer wins).
//!
//! Animation execution is out of scope: [`playback`] only exposes keyframe
//! endpoints ([`Frame`]) for the built-in [`AnimationVariant`]s, and the
//! host maps them onto whatever animation primitives it has.
//!
//! ## Example
//!
//! ```rust
//! use underpass_transition::{TransitionState, Visibility};
//!
//! let mut state = TransitionState::new();
//!
//! // First mount, not animated: shown immediately, nothing to play.
//! let t = state.observe(Visibility::Open, false);
//! assert!(state.displayed());
//! assert!(t.animation.is_none());
//!
//! // A route is pushed on top; play the hide animation, then hide.
//! let t = state.observe(Visibility::Hidden, true);
//! let cycle = t.cycle;
//! assert!(state.displayed());
//! assert!(state.complete(cycle));
//! assert!(!state.displayed());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod machine;
mod variants;
mod visibility;

pub use machine::{Transition, TransitionState};
pub use variants::{AnimationKind, AnimationVariant, Frame, Playback, playback};
pub use visibility::{StackSlot, Visibility, compute_visibility};
