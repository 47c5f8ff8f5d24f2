//! Input intent components.
//!
//! Intents are the controller's view of the input device. Whatever produces
//! input (the bundled [`WalkerInputPlugin`](crate::input::WalkerInputPlugin),
//! a gamepad mapping, an AI, a replay) writes these components; the
//! controller systems only read them.

use bevy::prelude::*;

/// Directional movement intent, read once per fixed step.
///
/// Axes are conventionally in `[-1, 1]` but are not clamped: larger values
/// only change the input direction, since the direction is normalized.
///
/// # Example
///
/// ```rust
/// use planet_walker::prelude::*;
///
/// let mut intent = WalkIntent::default();
/// intent.set_axes(0.0, 1.0);
/// assert!(intent.is_moving());
///
/// intent.clear();
/// assert!(!intent.is_moving());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct WalkIntent {
    /// `Horizontal` axis: positive strafes right.
    pub horizontal: f32,
    /// `Vertical` axis: positive walks toward the camera's facing.
    pub vertical: f32,
    /// Whether the run trigger is currently held.
    pub run_held: bool,
}

impl WalkIntent {
    /// Create an intent with the given axes.
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
            run_held: false,
        }
    }

    /// Set both axes.
    pub fn set_axes(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal = horizontal;
        self.vertical = vertical;
    }

    /// Set the run trigger state.
    pub fn set_run_held(&mut self, held: bool) {
        self.run_held = held;
    }

    /// Builder: hold the run trigger.
    pub fn running(mut self) -> Self {
        self.run_held = true;
        self
    }

    /// Clear axes and the run trigger.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Check if there is any axis input.
    pub fn is_moving(&self) -> bool {
        self.horizontal != 0.0 || self.vertical != 0.0
    }
}

/// Pointer motion waiting to be applied by the look pass.
///
/// Deltas accumulate until the next frame's look update drains them, so
/// several input events within one frame are all applied. Positive `x` is
/// pointer right, positive `y` is pointer up.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct LookIntent {
    /// Pending pointer delta.
    pub delta: Vec2,
}

impl LookIntent {
    /// Add pointer motion.
    pub fn add(&mut self, delta: Vec2) {
        self.delta += delta;
    }

    /// Take the pending motion, leaving zero behind.
    pub fn take(&mut self) -> Vec2 {
        std::mem::take(&mut self.delta)
    }
}
