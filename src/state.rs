//! Runtime state components.
//!
//! [`WalkerState`] is inserted when a walker attaches successfully and is
//! rewritten by the look and surface systems. [`Running`] is a marker kept in
//! sync with the run classification so other systems can filter on it.

use bevy::prelude::*;

/// Per-walker state owned by the controller systems.
///
/// Only entities carrying this component are ticked. Its absence after the
/// walker config was added means the attach step rejected the body.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct WalkerState {
    /// Accumulated camera pitch in degrees, always within the pitch limit.
    pub(crate) pitch: f32,
    /// Run classification from the most recent fixed step.
    pub(crate) is_running: bool,
    /// Last valid outward surface normal.
    pub(crate) normal: Vec3,
    /// Last valid camera forward on the tangent plane.
    pub(crate) forward: Vec3,
    /// Speed resolved during the most recent fixed step.
    pub(crate) move_speed: f32,
    /// Input-driven part of the velocity written during the last fixed step.
    pub(crate) tangential_velocity: Vec3,
    /// Force accumulated this step, flushed by backends that buffer forces.
    #[reflect(ignore)]
    pub(crate) accumulated_force: Vec3,
    /// Force handed to the physics engine last step.
    #[reflect(ignore)]
    pub(crate) applied_force: Vec3,
}

impl Default for WalkerState {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            is_running: false,
            normal: Vec3::Y,
            forward: Vec3::NEG_Z,
            move_speed: 0.0,
            tangential_velocity: Vec3::ZERO,
            accumulated_force: Vec3::ZERO,
            applied_force: Vec3::ZERO,
        }
    }
}

impl WalkerState {
    /// Seed the state from a body orientation.
    ///
    /// The body's current up and forward become the fallback normal and
    /// forward until the first valid surface step replaces them.
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            normal: (rotation * Vec3::Y).normalize_or(Vec3::Y),
            forward: (rotation * Vec3::NEG_Z).normalize_or(Vec3::NEG_Z),
            ..default()
        }
    }

    /// Whether the walker was running during the last fixed step.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Accumulated camera pitch in degrees (positive looks down).
    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Last valid outward surface normal.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Last valid camera forward projected on the tangent plane.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Last valid right direction on the tangent plane.
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.forward.cross(self.normal)
    }

    /// Speed resolved during the most recent fixed step.
    #[inline]
    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Input-driven velocity written during the most recent fixed step.
    #[inline]
    pub fn tangential_velocity(&self) -> Vec3 {
        self.tangential_velocity
    }

    /// Reset the pitch, e.g. after teleporting a walker.
    pub fn reset_pitch(&mut self) {
        self.pitch = 0.0;
    }

    #[cfg_attr(not(feature = "rapier3d"), allow(dead_code))]
    pub(crate) fn add_force(&mut self, force: Vec3) {
        self.accumulated_force += force;
    }

    /// Start a new step: returns the force applied last step so it can be
    /// removed from the engine's accumulator, and clears the local one.
    #[cfg_attr(not(feature = "rapier3d"), allow(dead_code))]
    pub(crate) fn prepare_new_step(&mut self) -> Vec3 {
        self.accumulated_force = Vec3::ZERO;
        std::mem::take(&mut self.applied_force)
    }

    /// Finish a step: returns the force accumulated this step and remembers
    /// it for the next [`prepare_new_step`](Self::prepare_new_step).
    #[cfg_attr(not(feature = "rapier3d"), allow(dead_code))]
    pub(crate) fn finalize_step(&mut self) -> Vec3 {
        let force = std::mem::take(&mut self.accumulated_force);
        self.applied_force = force;
        force
    }
}

/// Marker component present while the walker is running.
///
/// Added and removed at the end of every fixed step to mirror
/// [`WalkerState::is_running`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Running;
