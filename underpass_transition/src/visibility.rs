// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Projection from stack order and opacity to per-route visibility.

use alloc::vec::Vec;
use core::cmp::Ordering;

/// Render-time visibility of one stack entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// The route is shown.
    Open,
    /// The route is behind the current one, covered by an opaque route.
    Hidden,
    /// The route is ahead of the current one, or deleted.
    Closed,
}

/// The per-route inputs to [`compute_visibility`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackSlot {
    /// The route is marked deleted and awaiting removal.
    pub deleted: bool,
    /// The route fully covers what is behind it.
    pub opaque: bool,
}

/// Compute the visibility of every stack entry given the current index.
///
/// - Deleted routes are [`Closed`](Visibility::Closed) regardless of
///   position.
/// - Routes after `current` are [`Closed`](Visibility::Closed); the current
///   route is [`Open`](Visibility::Open).
/// - Routes before `current` are [`Hidden`](Visibility::Hidden), unless the
///   route itself and every live route between it and `current` are all
///   transparent, in which case the route shows through and is
///   [`Open`](Visibility::Open). Routes inside a run of transparent overlays
///   keep rendering as if they were at the front.
pub fn compute_visibility(slots: &[StackSlot], current: usize) -> Vec<Visibility> {
    slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            if slot.deleted {
                return Visibility::Closed;
            }
            match i.cmp(&current) {
                Ordering::Greater => Visibility::Closed,
                Ordering::Equal => Visibility::Open,
                Ordering::Less => {
                    let covered = slots[i..current]
                        .iter()
                        .any(|s| !s.deleted && s.opaque);
                    if covered {
                        Visibility::Hidden
                    } else {
                        Visibility::Open
                    }
                }
            }
        })
        .collect()
}
