//! Time-based tweens with one slot per animated property
//!
//! A [`TweenSlot`] owns at most one running [`Tween`]. Starting a new tween
//! on a busy slot cancels the running one, so repeated clicks on the same
//! button retarget the animation instead of stacking competing updates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Easing curves, applied to normalized progress in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Quadratic ease-out, the usual default for UI motion
    #[default]
    QuadOut,
    QuadInOut,
    CubicOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Values a tween can interpolate
pub trait Interpolate: Copy {
    fn interpolate(from: Self, to: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Interpolate for [f32; 3] {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        [
            f32::interpolate(from[0], to[0], t),
            f32::interpolate(from[1], to[1], t),
            f32::interpolate(from[2], to[2], t),
        ]
    }
}

/// A single animation from one value to another
#[derive(Debug, Clone, PartialEq)]
pub struct Tween<T> {
    from: T,
    to: T,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl<T: Interpolate> Tween<T> {
    pub fn new(from: T, to: T, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    pub fn target(&self) -> T {
        self.to
    }

    /// Linear progress in `[0, 1]`; zero-length tweens are always complete
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn value(&self) -> T {
        if self.is_finished() {
            // Land exactly on the target, free of easing round-off
            return self.to;
        }
        T::interpolate(self.from, self.to, self.easing.apply(self.progress()))
    }

    /// Move time forward and return the new value
    pub fn advance(&mut self, dt: Duration) -> T {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.value()
    }
}

/// The animation slot of one property
#[derive(Debug, Clone)]
pub struct TweenSlot<T> {
    active: Option<Tween<T>>,
}

impl<T> Default for TweenSlot<T> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<T: Interpolate> TweenSlot<T> {
    /// Start animating toward `to`, canceling whatever was running
    pub fn start(&mut self, from: T, to: T, duration: Duration, easing: Easing) {
        if self.active.is_some() {
            tracing::trace!("Canceling in-flight tween");
        }
        self.active = Some(Tween::new(from, to, duration, easing));
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<T> {
        self.active.as_ref().map(Tween::target)
    }

    /// Advance the running tween. Returns the value to write this frame, or
    /// `None` when idle. The slot empties itself after yielding the final
    /// value.
    pub fn advance(&mut self, dt: Duration) -> Option<T> {
        let tween = self.active.as_mut()?;
        let value = tween.advance(dt);
        if tween.is_finished() {
            self.active = None;
        }
        Some(value)
    }
}
