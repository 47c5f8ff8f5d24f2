//! Built-in point-mass backend.
//!
//! A minimal physics backend for hosts that have no physics engine: each
//! walker body carries a [`BasicBody`] and is integrated with semi-implicit
//! Euler at the end of every fixed step. No collisions are resolved, so on
//! its own the inward pull keeps accelerating the body toward the center;
//! hosts typically pair it with their own ground constraint.

use bevy::prelude::*;

use crate::backend::WalkerPhysicsBackend;
use crate::PlanetWalkerSet;

/// Point-mass backend using [`BasicBody`] components.
pub struct BasicBackend;

impl WalkerPhysicsBackend for BasicBackend {
    fn plugin() -> impl Plugin {
        BasicBackendPlugin
    }

    fn prepare_body(world: &mut World, entity: Entity) {
        let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
            return;
        };
        match entity_mut.get_mut::<BasicBody>() {
            Some(mut body) => body.gravity_scale = 0.0,
            None => {
                entity_mut.insert(BasicBody {
                    gravity_scale: 0.0,
                    ..default()
                });
            }
        }
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<BasicBody>(entity)
            .map(|b| b.velocity)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut body) = world.get_mut::<BasicBody>(entity) {
            body.velocity = velocity;
        }
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec3) {
        if let Some(mut body) = world.get_mut::<BasicBody>(entity) {
            body.force += force;
        }
    }
}

/// Rigid-body state for the [`BasicBackend`].
///
/// Rotation is never integrated; only the controller writes it.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct BasicBody {
    /// Linear velocity (units/second).
    pub velocity: Vec3,
    /// Force accumulated for the current step, cleared after integration.
    pub force: Vec3,
    /// Mass used to turn force into acceleration. Non-positive masses are
    /// treated as 1.
    pub mass: f32,
    /// Multiplier on [`BasicGravity`]. Walkers get 0 on attach.
    pub gravity_scale: f32,
}

impl Default for BasicBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            mass: 1.0,
            gravity_scale: 1.0,
        }
    }
}

impl BasicBody {
    /// Create a body with the given mass.
    pub fn with_mass(mass: f32) -> Self {
        Self {
            mass,
            ..default()
        }
    }

    #[inline]
    fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 && self.mass.is_finite() {
            self.mass.recip()
        } else {
            1.0
        }
    }
}

/// Ambient gravity applied to [`BasicBody`] components scaled by their
/// `gravity_scale`.
#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Resource)]
pub struct BasicGravity(pub Vec3);

impl Default for BasicGravity {
    fn default() -> Self {
        Self(Vec3::new(0.0, -9.81, 0.0))
    }
}

/// Plugin that integrates [`BasicBody`] components.
pub struct BasicBackendPlugin;

impl Plugin for BasicBackendPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BasicBody>();
        app.register_type::<BasicGravity>();
        app.init_resource::<BasicGravity>();

        app.add_systems(
            FixedUpdate,
            integrate_basic_bodies.in_set(PlanetWalkerSet::FinalApplication),
        );
    }
}

/// Semi-implicit Euler step: velocity first, then position with the new
/// velocity.
pub fn integrate_basic_bodies(
    time: Res<Time<Fixed>>,
    gravity: Res<BasicGravity>,
    mut q_bodies: Query<(&mut BasicBody, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (mut body, mut transform) in &mut q_bodies {
        let acceleration = body.force * body.inverse_mass() + gravity.0 * body.gravity_scale;
        body.velocity += acceleration * dt;
        body.force = Vec3::ZERO;
        transform.translation += body.velocity * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(app: &mut App, entity: Entity) -> BasicBody {
        app.world_mut().run_schedule(FixedUpdate);
        *app.world().get::<BasicBody>(entity).unwrap()
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(BasicBackendPlugin);
        app.insert_resource(Time::<Fixed>::from_hz(50.0));
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(std::time::Duration::from_millis(20));
        app
    }

    #[test]
    fn force_is_integrated_and_cleared() {
        let mut app = test_app();
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                BasicBody {
                    force: Vec3::new(2.0, 0.0, 0.0),
                    mass: 2.0,
                    gravity_scale: 0.0,
                    ..default()
                },
            ))
            .id();

        let body = step(&mut app, entity);
        assert!((body.velocity.x - 0.02).abs() < 1.0e-6);
        assert_eq!(body.force, Vec3::ZERO);

        let transform = app.world().get::<Transform>(entity).unwrap();
        assert!((transform.translation.x - 0.02 * 0.02).abs() < 1.0e-6);
    }

    #[test]
    fn gravity_is_scaled() {
        let mut app = test_app();
        let entity = app
            .world_mut()
            .spawn((Transform::default(), BasicBody::default()))
            .id();
        let body = step(&mut app, entity);
        assert!((body.velocity.y + 9.81 * 0.02).abs() < 1.0e-5);
    }

    #[test]
    fn prepare_body_disables_gravity() {
        let mut world = World::new();
        let with_body = world.spawn(BasicBody::with_mass(3.0)).id();
        let without_body = world.spawn_empty().id();

        BasicBackend::prepare_body(&mut world, with_body);
        BasicBackend::prepare_body(&mut world, without_body);

        let body = world.get::<BasicBody>(with_body).unwrap();
        assert_eq!(body.gravity_scale, 0.0);
        assert_eq!(body.mass, 3.0);
        assert_eq!(
            world.get::<BasicBody>(without_body).unwrap().gravity_scale,
            0.0
        );
    }

    #[test]
    fn non_positive_mass_falls_back_to_unit() {
        assert_eq!(BasicBody::with_mass(0.0).inverse_mass(), 1.0);
        assert_eq!(BasicBody::with_mass(-2.0).inverse_mass(), 1.0);
        assert_eq!(BasicBody::with_mass(4.0).inverse_mass(), 0.25);
    }
}
