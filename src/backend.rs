//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement to
//! drive a planet walker. The controller owns orientation and tangential
//! velocity; the backend owns integration. Swapping engines (the bundled
//! [`BasicBackend`](crate::basic::BasicBackend), Rapier3D, something custom)
//! only means implementing this trait.

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// All methods are static and operate on the [`World`], so the controller
/// systems can stay generic without holding backend-specific queries.
///
/// # Example
///
/// For an example implementation, see [`BasicBackend`](crate::basic::BasicBackend)
/// or, with the `rapier3d` feature, `Rapier3dBackend`.
pub trait WalkerPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Prepare a freshly attached body.
    ///
    /// Must disable any ambient gravity the engine applies to the body and
    /// stop the engine from integrating its rotation: orientation belongs
    /// to the controller and the only pull is the controller's own force.
    fn prepare_body(world: &mut World, entity: Entity);

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Apply a force to an entity.
    ///
    /// Force is applied over the physics timestep.
    fn apply_force(world: &mut World, entity: Entity, force: Vec3);
}
