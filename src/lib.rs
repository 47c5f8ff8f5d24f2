//! # `planet_walker`
//!
//! A first-person controller for walking on the outside of a sphere, with
//! physics backend abstraction.
//!
//! This crate provides a controller that:
//! - Pulls the body toward a sphere center with a constant inward force
//! - Smoothly rotates the body so its up axis tracks the surface normal
//! - Moves the body on the tangent plane relative to where the camera faces
//! - Splits mouse look into camera pitch and body yaw
//! - Lets callers stack dynamic speed overrides on top of walk/run speeds
//! - Abstracts the physics backend (a built-in point-mass backend and
//!   Rapier3D included)
//!
//! ## Architecture
//!
//! A walker is a body entity carrying [`WalkerConfig`](config::WalkerConfig)
//! and [`WalkerLinks`](config::WalkerLinks), plus a separate camera entity
//! (usually a child of the body). Each fixed step:
//! 1. The outward normal is recomputed from the sphere center
//! 2. The body's rotation is slerped toward normal-up
//! 3. An inward pull force is handed to the backend
//! 4. Input is turned into a tangential velocity; the radial part of the
//!    body's velocity is kept
//!
//! Mouse look runs once per rendered frame.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use planet_walker::prelude::*;
//!
//! let mut world = World::new();
//! let planet = world.spawn(Transform::default()).id();
//! let camera = world.spawn(Transform::default()).id();
//!
//! // Spawn these on the body, next to the backend's physics components
//! let config = WalkerConfig::player();
//! let links = WalkerLinks::new(planet, camera);
//! ```

use bevy::prelude::*;

pub mod attach;
pub mod backend;
pub mod basic;
pub mod config;
pub mod input;
pub mod intent;
pub mod speed;
pub mod state;
pub mod surface;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::attach::{AttachError, AttachFailed, WalkerAttached};
    pub use crate::backend::WalkerPhysicsBackend;
    pub use crate::basic::{BasicBackend, BasicBody, BasicGravity};
    pub use crate::config::{WalkerConfig, WalkerLinks};
    pub use crate::input::{WalkerInput, WalkerInputPlugin};
    pub use crate::intent::{LookIntent, WalkIntent};
    pub use crate::speed::{FixedSpeed, SpeedOverrideId, SpeedOverrides, SpeedProvider};
    pub use crate::state::{Running, WalkerState};
    pub use crate::{PlanetWalkerPlugin, PlanetWalkerSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dWalkerBundle};
}

/// Phases of the walker update.
///
/// `Input` and `Look` run in `Update`; the rest run in `FixedUpdate`, in
/// declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanetWalkerSet {
    /// Devices are read into intents.
    Input,
    /// Camera pitch and body yaw.
    Look,
    /// Backend bookkeeping before any force is applied.
    Preparation,
    /// Surface normal.
    Sensors,
    /// Surface alignment and inward pull.
    Orientation,
    /// Run classification, tangential velocity, state markers.
    Movement,
    /// Backends flush forces or integrate.
    FinalApplication,
}

/// Main plugin for the planet walker.
///
/// This plugin is generic over a physics backend `B` which provides the
/// actual physics operations (velocity access, force application, etc.).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `BasicBackend`)
///
/// # Examples
///
/// With the built-in backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use planet_walker::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(PlanetWalkerPlugin::<BasicBackend>::default())
///     .add_plugins(WalkerInputPlugin::new())
///     .run();
/// ```
///
/// With the `rapier3d` feature, add `RapierPhysicsPlugin` and use
/// `PlanetWalkerPlugin::<Rapier3dBackend>` instead.
pub struct PlanetWalkerPlugin<B: backend::WalkerPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::WalkerPhysicsBackend> Default for PlanetWalkerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::WalkerPhysicsBackend> Plugin for PlanetWalkerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<config::WalkerConfig>();
        app.register_type::<config::WalkerLinks>();
        app.register_type::<intent::WalkIntent>();
        app.register_type::<intent::LookIntent>();
        app.register_type::<state::WalkerState>();
        app.register_type::<state::Running>();
        app.register_type::<speed::SpeedOverrideId>();

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        app.add_observer(attach::on_walker_added::<B>);

        app.configure_sets(
            Update,
            (PlanetWalkerSet::Input, PlanetWalkerSet::Look).chain(),
        );
        app.configure_sets(
            FixedUpdate,
            (
                PlanetWalkerSet::Preparation,
                PlanetWalkerSet::Sensors,
                PlanetWalkerSet::Orientation,
                PlanetWalkerSet::Movement,
                PlanetWalkerSet::FinalApplication,
            )
                .chain(),
        );

        app.add_systems(Update, systems::apply_look.in_set(PlanetWalkerSet::Look));

        // Surface pass in FixedUpdate for consistent physics behavior
        app.add_systems(
            FixedUpdate,
            (
                systems::update_surface_normal.in_set(PlanetWalkerSet::Sensors),
                (systems::align_to_surface, systems::apply_radial_pull::<B>)
                    .chain()
                    .in_set(PlanetWalkerSet::Orientation),
                (
                    systems::resolve_running,
                    systems::apply_surface_movement::<B>,
                    systems::sync_state_markers,
                )
                    .chain()
                    .in_set(PlanetWalkerSet::Movement),
            ),
        );
    }
}
