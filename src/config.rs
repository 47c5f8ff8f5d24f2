//! Walker configuration components.
//!
//! This module defines the tuning surface of a planet walker (speeds, look
//! sensitivity, limits, alignment rate) and the links to the two external
//! entities the controller reads every tick.

use bevy::prelude::*;

/// Configuration parameters for a planet walker.
///
/// Attaching this component to a body is what turns it into a walker: an
/// observer validates the body's [`WalkerLinks`], prepares the rigid body
/// through the physics backend and seeds the runtime state.
///
/// All values may be changed between ticks. No field is validated; zero or
/// negative values give well-defined (if odd) behaviour, e.g. a negative
/// `speed` walks backwards.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct WalkerConfig {
    // === Movement Settings ===
    /// Walking speed on the tangent plane (units/second).
    pub speed: f32,

    /// Whether holding `run_key` switches to `run_speed`.
    pub can_run: bool,

    /// Running speed on the tangent plane (units/second).
    pub run_speed: f32,

    /// Key that must be held to run.
    pub run_key: KeyCode,

    // === Look Settings ===
    /// Pointer delta to degrees multiplier (per second of frame time).
    pub mouse_sensitivity: f32,

    /// Roll limit in degrees.
    ///
    /// Reserved. Roll is resolved by surface alignment and this value is not
    /// read by the current systems.
    pub roll_limit: f32,

    /// Rate at which the body's up axis is blended toward the surface normal.
    ///
    /// The per-step slerp factor is `align_speed * dt`, clamped to `[0, 1]`.
    pub align_speed: f32,

    /// Camera pitch limit in degrees, applied symmetrically.
    pub pitch_limit: f32,

    // === Pull Settings ===
    /// Magnitude of the constant force pulling the body toward the sphere
    /// center every fixed step.
    pub pull_force: f32,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            // Movement
            speed: 5.0,
            can_run: true,
            run_speed: 9.0,
            run_key: KeyCode::ShiftLeft,

            // Look
            mouse_sensitivity: 100.0,
            roll_limit: 90.0,
            align_speed: 10.0,
            pitch_limit: 90.0,

            // Pull
            pull_force: 100.0,
        }
    }
}

impl WalkerConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config tuned for mouse-driven player control.
    pub fn player() -> Self {
        Self {
            mouse_sensitivity: 12.0,
            pitch_limit: 85.0,
            ..default()
        }
    }

    /// Create a config for slow, heavy walkers (NPCs, cinematic bodies).
    pub fn slow() -> Self {
        Self {
            speed: 2.0,
            can_run: false,
            align_speed: 4.0,
            ..default()
        }
    }

    /// Speed selected by the run state, ignoring any override.
    #[inline]
    pub fn base_speed(&self, is_running: bool) -> f32 {
        if is_running {
            self.run_speed
        } else {
            self.speed
        }
    }

    /// Builder: set walking speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder: enable running with the given speed and key.
    pub fn with_run(mut self, run_speed: f32, run_key: KeyCode) -> Self {
        self.can_run = true;
        self.run_speed = run_speed;
        self.run_key = run_key;
        self
    }

    /// Builder: disable running.
    pub fn without_run(mut self) -> Self {
        self.can_run = false;
        self
    }

    /// Builder: set pointer sensitivity.
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    /// Builder: set the alignment rate.
    pub fn with_align_speed(mut self, align_speed: f32) -> Self {
        self.align_speed = align_speed;
        self
    }

    /// Builder: set the camera pitch limit (degrees).
    pub fn with_pitch_limit(mut self, limit: f32) -> Self {
        self.pitch_limit = limit;
        self
    }

    /// Builder: set the reserved roll limit (degrees).
    pub fn with_roll_limit(mut self, limit: f32) -> Self {
        self.roll_limit = limit;
        self
    }

    /// Builder: set the magnitude of the inward pull.
    pub fn with_pull_force(mut self, force: f32) -> Self {
        self.pull_force = force;
        self
    }
}

/// The external entities a walker depends on.
///
/// Both links are required. They are checked once when the walker is
/// attached; a walker whose links are missing never ticks. The sphere center
/// may be nested in a hierarchy (e.g. under an orbit pivot) and is resolved
/// in world space. The walker body itself must be a root entity.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct WalkerLinks {
    /// Entity whose translation is the center of the planet.
    pub sphere_center: Entity,
    /// Camera entity that receives pitch and provides the facing direction.
    pub camera: Entity,
}

impl WalkerLinks {
    /// Create links to a sphere center and a camera.
    pub fn new(sphere_center: Entity, camera: Entity) -> Self {
        Self {
            sphere_center,
            camera,
        }
    }
}
