// Copyright 2025 the Underpass Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in animation variants as keyframe endpoint data.
//!
//! The host owns animation execution; this module only says what the
//! endpoints of each transition look like. Percent units throughout:
//! `scale` and the translations are percentages of the element size,
//! `opacity` runs 0 to 1.

/// Which transition of a route is being animated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// The route enters the stack.
    Open,
    /// The route leaves the stack.
    Close,
    /// Another route is pushed over this one.
    Hide,
    /// The route on top went away and this one resurfaces.
    Unhide,
}

/// The built-in animation styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationVariant {
    /// No animation; transitions apply instantly.
    None,
    /// Fade opacity in and out.
    Fade,
    /// Scale up from 60% on enter, overshoot to 120% when covered.
    #[default]
    Scale,
    /// Slide in from the right, parallax to the left when covered.
    Slide,
    /// Same as [`Slide`](Self::Slide) on the vertical axis.
    SlideUp,
    /// No visible animation, but exits complete only after the route's
    /// transition duration. Lets custom exit effects finish first.
    DelayedExit,
}

/// One keyframe endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Opacity from 0 to 1.
    pub opacity: f32,
    /// Horizontal translation in percent of the element width.
    pub translate_x: f32,
    /// Vertical translation in percent of the element height.
    pub translate_y: f32,
    /// Scale in percent.
    pub scale: f32,
}

impl Frame {
    /// The resting frame: fully opaque, untranslated, at natural size.
    pub const REST: Self = Self {
        opacity: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 100.0,
    };

    const fn faded(self) -> Self {
        Self {
            opacity: 0.0,
            ..self
        }
    }

    const fn scaled(scale: f32) -> Self {
        Self {
            scale,
            ..Self::REST
        }
    }

    const fn shifted_x(translate_x: f32) -> Self {
        Self {
            translate_x,
            ..Self::REST
        }
    }

    const fn shifted_y(translate_y: f32) -> Self {
        Self {
            translate_y,
            ..Self::REST
        }
    }
}

/// How the host should run one transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Playback {
    /// Apply the end state and complete immediately.
    Instant,
    /// Interpolate from the first frame to the second over the route's
    /// transition duration, then complete.
    Keyframes([Frame; 2]),
    /// Apply the end state now but complete only after the route's
    /// transition duration.
    Delayed,
}

/// The playback for one variant and transition kind.
pub fn playback(variant: AnimationVariant, kind: AnimationKind) -> Playback {
    match variant {
        AnimationVariant::None => Playback::Instant,
        AnimationVariant::DelayedExit => Playback::Delayed,
        AnimationVariant::Fade => {
            let frames = match kind {
                AnimationKind::Open | AnimationKind::Unhide => [Frame::REST.faded(), Frame::REST],
                AnimationKind::Close | AnimationKind::Hide => [Frame::REST, Frame::REST.faded()],
            };
            Playback::Keyframes(frames)
        }
        AnimationVariant::Scale => {
            let frames = match kind {
                AnimationKind::Open => [Frame::scaled(60.0).faded(), Frame::REST],
                AnimationKind::Close => [Frame::REST, Frame::scaled(60.0).faded()],
                AnimationKind::Hide => [Frame::REST, Frame::scaled(120.0)],
                AnimationKind::Unhide => [Frame::scaled(120.0), Frame::REST],
            };
            Playback::Keyframes(frames)
        }
        AnimationVariant::Slide => {
            let frames = match kind {
                AnimationKind::Open => [Frame::shifted_x(100.0), Frame::REST],
                AnimationKind::Close => [Frame::REST, Frame::shifted_x(100.0)],
                AnimationKind::Hide => [Frame::REST, Frame::shifted_x(-50.0)],
                AnimationKind::Unhide => [Frame::shifted_x(-50.0), Frame::REST],
            };
            Playback::Keyframes(frames)
        }
        AnimationVariant::SlideUp => {
            let frames = match kind {
                AnimationKind::Open => [Frame::shifted_y(100.0), Frame::REST],
                AnimationKind::Close => [Frame::REST, Frame::shifted_y(100.0)],
                AnimationKind::Hide => [Frame::REST, Frame::shifted_y(-50.0)],
                AnimationKind::Unhide => [Frame::shifted_y(-50.0), Frame::REST],
            };
            Playback::Keyframes(frames)
        }
    }
}
