// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-route transition state machine with a cycle guard.

use crate::variants::AnimationKind;
use crate::visibility::Visibility;

/// What the host should do after a visibility observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The cycle this transition belongs to. Pass it back to
    /// [`TransitionState::complete`] when the animation finishes.
    pub cycle: u64,
    /// The element must become displayed before playback starts.
    pub show_now: bool,
    /// Which animation to play, if any.
    pub animation: Option<AnimationKind>,
}

/// Tracks one mounted route's visibility transitions.
///
/// Feed every visibility change to [`TransitionState::observe`] and report
/// finished animations through [`TransitionState::complete`] with the cycle
/// the observation returned. Each observation that changes visibility bumps
/// the cycle, so a completion for a superseded transition is ignored and
/// can never hide an element that a newer transition re-opened.
///
/// [`TransitionState::displayed`] is the resulting display decision: exits
/// keep the element displayed until their completion arrives, entries show
/// it immediately.
#[derive(Clone, Debug, Default)]
pub struct TransitionState {
    last: Option<Visibility>,
    cycle: u64,
    displayed: bool,
    pending_hide: Option<u64>,
}

impl TransitionState {
    /// State for a freshly mounted route that has not been observed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the route's visibility.
    ///
    /// `initial_animated` only matters for the very first observation: a
    /// route that mounts open plays its open animation unless it was pushed
    /// without animation (the initial route of a navigator).
    pub fn observe(&mut self, visibility: Visibility, initial_animated: bool) -> Transition {
        if self.last == Some(visibility) {
            return Transition {
                cycle: self.cycle,
                show_now: false,
                animation: None,
            };
        }

        self.cycle += 1;
        let cycle = self.cycle;
        let first = self.last.is_none();
        let last = self.last.replace(visibility);

        match (visibility, last) {
            (Visibility::Open, None) => {
                self.displayed = true;
                self.pending_hide = None;
                Transition {
                    cycle,
                    show_now: true,
                    animation: initial_animated.then_some(AnimationKind::Open),
                }
            }
            (Visibility::Open, Some(Visibility::Closed)) => {
                self.displayed = true;
                self.pending_hide = None;
                Transition {
                    cycle,
                    show_now: true,
                    animation: Some(AnimationKind::Open),
                }
            }
            (Visibility::Closed, Some(Visibility::Open)) => {
                self.pending_hide = Some(cycle);
                Transition {
                    cycle,
                    show_now: false,
                    animation: Some(AnimationKind::Close),
                }
            }
            (Visibility::Hidden, Some(Visibility::Open)) => {
                self.pending_hide = Some(cycle);
                Transition {
                    cycle,
                    show_now: false,
                    animation: Some(AnimationKind::Hide),
                }
            }
            (Visibility::Open, Some(Visibility::Hidden)) => {
                self.displayed = true;
                self.pending_hide = None;
                Transition {
                    cycle,
                    show_now: true,
                    animation: Some(AnimationKind::Unhide),
                }
            }
            // Closed <-> Hidden and first observations that are not open:
            // no animation, display follows visibility directly.
            (visibility, _) => {
                debug_assert!(visibility != Visibility::Open || first);
                self.displayed = visibility == Visibility::Open;
                self.pending_hide = None;
                Transition {
                    cycle,
                    show_now: self.displayed,
                    animation: None,
                }
            }
        }
    }

    /// Report that the animation started in `cycle` has finished.
    ///
    /// Applies the deferred hide and returns `true` only if that cycle is
    /// still current; stale completions are dropped.
    pub fn complete(&mut self, cycle: u64) -> bool {
        if self.pending_hide == Some(cycle) && cycle == self.cycle {
            self.pending_hide = None;
            self.displayed = false;
            true
        } else {
            false
        }
    }

    /// Whether the element is currently displayed.
    pub fn displayed(&self) -> bool {
        self.displayed
    }

    /// The current cycle; bumps on every visibility change.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The last observed visibility, if any.
    pub fn last_visibility(&self) -> Option<Visibility> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_mount_open_without_animation() {
        let mut state = TransitionState::new();
        let t = state.observe(Visibility::Open, false);
        assert!(t.show_now);
        assert_eq!(t.animation, None);
        assert!(state.displayed());
    }

    #[test]
    fn first_mount_open_with_animation() {
        let mut state = TransitionState::new();
        let t = state.observe(Visibility::Open, true);
        assert!(t.show_now);
        assert_eq!(t.animation, Some(AnimationKind::Open));
        assert!(state.displayed());
    }

    #[test]
    fn first_mount_closed_is_not_displayed() {
        let mut state = TransitionState::new();
        let t = state.observe(Visibility::Closed, true);
        assert!(!t.show_now);
        assert_eq!(t.animation, None);
        assert!(!state.displayed());
    }

    #[test]
    fn closed_to_open_plays_open() {
        let mut state = TransitionState::new();
        state.observe(Visibility::Closed, true);
        let t = state.observe(Visibility::Open, true);
        assert!(t.show_now);
        assert_eq!(t.animation, Some(AnimationKind::Open));
    }

    #[test]
    fn open_to_closed_hides_on_completion() {
        let mut state = TransitionState::new();
        state.observe(Visibility::Open, false);
        let t = state.observe(Visibility::Closed, true);
        assert_eq!(t.animation, Some(AnimationKind::Close));
        // Still displayed while the exit animation runs.
        assert!(state.displayed());
        assert!(state.complete(t.cycle));
        assert!(!state.displayed());
    }

    #[test]
    fn open_to_hidden_hides_on_completion() {
        let mut state = TransitionState::new();
        state.observe(Visibility::Open, false);
        let t = state.observe(Visibility::Hidden, true);
        assert_eq!(t.animation, Some(AnimationKind::Hide));
        assert!(state.complete(t.cycle));
        assert!(!state.displayed());
    }

    #[test]
    fn hidden_to_open_shows_immediately() {
        let mut state = TransitionState::new();
        state.observe(Visibility::Open, false);
        let hide = state.observe(Visibility::Hidden, true);
        state.complete(hide.cycle);
        let t = state.observe(Visibility::Open, true);
        assert!(t.show_now);
        assert_eq!(t.animation, Some(AnimationKind::Unhide));
        assert!(state.displayed());
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut state = TransitionState::new();
        state.observe(Visibility::Open, false);

        // Route goes behind another one, then comes back before the hide
        // animation finished.
        let hide = state.observe(Visibility::Hidden, true);
        let unhide = state.observe(Visibility::Open, true);
        assert_ne!(hide.cycle, unhide.cycle);

        // The late hide completion must not blank the re-opened route.
        assert!(!state.complete(hide.cycle));
        assert!(state.displayed());
    }

    #[test]
    fn repeated_visibility_is_a_no_op() {
        let mut state = TransitionState::new();
        let first = state.observe(Visibility::Open, false);
        let again = state.observe(Visibility::Open, true);
        assert_eq!(again.cycle, first.cycle);
        assert_eq!(again.animation, None);
        assert!(!again.show_now);
    }

    #[test]
    fn closed_hidden_transitions_have_no_animation() {
        let mut state = TransitionState::new();
        state.observe(Visibility::Closed, true);
        let t = state.observe(Visibility::Hidden, true);
        assert_eq!(t.animation, None);
        assert!(!state.displayed());

        let t = state.observe(Visibility::Closed, true);
        assert_eq!(t.animation, None);
        assert!(!state.displayed());
    }

    #[test]
    fn completion_for_wrong_cycle_does_nothing() {
        let mut state = TransitionState::new();
        state.observe(Visibility::Open, false);
        let t = state.observe(Visibility::Closed, true);
        assert!(!state.complete(t.cycle + 1));
        assert!(state.displayed());
        assert!(state.complete(t.cycle));
    }
}
