//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::backend::WalkerPhysicsBackend;
use crate::state::WalkerState;
use crate::PlanetWalkerSet;

/// Rapier3D physics backend for the planet walker.
///
/// Velocity is read from and written to the [`Velocity`] component. Forces
/// are accumulated on the [`WalkerState`] during the step and handed to
/// [`ExternalForce`] once at the end, so forces other systems put on the
/// body are left untouched.
pub struct Rapier3dBackend;

impl WalkerPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn prepare_body(world: &mut World, entity: Entity) {
        let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
            return;
        };

        // Ambient gravity is replaced by the walker's own inward pull.
        entity_mut.insert(GravityScale(0.0));

        // Orientation is written by the controller only.
        let locked = entity_mut
            .get::<LockedAxes>()
            .copied()
            .unwrap_or(LockedAxes::empty());
        entity_mut.insert(locked | LockedAxes::ROTATION_LOCKED);

        if !entity_mut.contains::<Velocity>() {
            entity_mut.insert(Velocity::default());
        }
        if !entity_mut.contains::<ExternalForce>() {
            entity_mut.insert(ExternalForce::default());
        }
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec3) {
        // Accumulate into WalkerState instead of directly modifying ExternalForce.
        // Forces reach ExternalForce at the end of the step in apply_walker_forces.
        if let Some(mut state) = world.get_mut::<WalkerState>(entity) {
            state.add_force(force);
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the planet walker.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            clear_walker_forces.in_set(PlanetWalkerSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            apply_walker_forces.in_set(PlanetWalkerSet::FinalApplication),
        );
    }
}

/// Remove the force the walker applied last step from [`ExternalForce`].
///
/// This restores `ExternalForce` to whatever other systems put there.
pub fn clear_walker_forces(mut q: Query<(&mut ExternalForce, &mut WalkerState)>) {
    for (mut ext_force, mut state) in &mut q {
        let force_to_subtract = state.prepare_new_step();
        ext_force.force -= force_to_subtract;
    }
}

/// Add the force accumulated this step to [`ExternalForce`].
pub fn apply_walker_forces(mut q: Query<(&mut ExternalForce, &mut WalkerState)>) {
    for (mut ext_force, mut state) in &mut q {
        let force_to_apply = state.finalize_step();
        ext_force.force += force_to_apply;
    }
}

/// Bundle for creating a planet walker body with Rapier3D physics.
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `velocity`: Zero velocity
/// - `external_force`: Zero force (accumulated by walker systems)
/// - `locked_axes`: [`LockedAxes::ROTATION_LOCKED`]
/// - `gravity_scale`: 0 (the walker pulls itself toward the planet)
/// - `damping`: Linear 0.0, Angular 1.0
///
/// # Example
///
/// ```ignore
/// commands.spawn((
///     Transform::from_xyz(0.0, 51.0, 0.0),
///     WalkerConfig::player(),
///     WalkerLinks::new(planet, camera),
///     Rapier3dWalkerBundle::new(),
///     Collider::capsule_y(0.5, 0.4),
/// ));
/// ```
#[derive(Bundle)]
pub struct Rapier3dWalkerBundle {
    /// The rigid body type. Should typically be [`RigidBody::Dynamic`].
    pub rigid_body: RigidBody,
    /// Current linear and angular velocity.
    pub velocity: Velocity,
    /// Forces handed to Rapier each step.
    pub external_force: ExternalForce,
    /// Rotation is locked; the controller writes it directly.
    pub locked_axes: LockedAxes,
    /// Ambient gravity multiplier.
    pub gravity_scale: GravityScale,
    /// Damping coefficients.
    pub damping: Damping,
}

impl Default for Rapier3dWalkerBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dWalkerBundle {
    /// Create a walker bundle with the documented defaults.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_force: ExternalForce::default(),
            locked_axes: LockedAxes::ROTATION_LOCKED,
            gravity_scale: GravityScale(0.0),
            damping: Damping {
                linear_damping: 0.0,
                angular_damping: 1.0,
            },
        }
    }

    /// Set the rigid body type.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Set the damping coefficients for velocity reduction.
    ///
    /// Linear damping slowly bleeds off the radial velocity the pull builds
    /// up; the tangential part is rewritten every step regardless.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.damping = Damping {
            linear_damping: linear,
            angular_damping: angular,
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    fn create_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app
    }

    #[test]
    fn rapier_backend_velocity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                RigidBody::Dynamic,
                Velocity::linear(Vec3::new(5.0, 3.0, 0.0)),
            ))
            .id();

        let vel = Rapier3dBackend::get_velocity(app.world(), entity);
        assert!((vel.x - 5.0).abs() < 0.01);
        assert!((vel.y - 3.0).abs() < 0.01);

        Rapier3dBackend::set_velocity(app.world_mut(), entity, Vec3::new(0.0, 0.0, 10.0));

        let vel = Rapier3dBackend::get_velocity(app.world(), entity);
        assert!((vel.z - 10.0).abs() < 0.01);
        assert!(vel.x.abs() < 0.01);
    }

    #[test]
    fn prepare_body_locks_rotation_and_gravity() {
        let mut app = create_test_app();
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                RigidBody::Dynamic,
                LockedAxes::TRANSLATION_LOCKED_X,
            ))
            .id();

        Rapier3dBackend::prepare_body(app.world_mut(), entity);

        let world = app.world();
        assert_eq!(world.get::<GravityScale>(entity).unwrap().0, 0.0);
        let locked = *world.get::<LockedAxes>(entity).unwrap();
        assert!(locked.contains(LockedAxes::ROTATION_LOCKED));
        assert!(locked.contains(LockedAxes::TRANSLATION_LOCKED_X));
        assert!(world.get::<Velocity>(entity).is_some());
        assert!(world.get::<ExternalForce>(entity).is_some());
    }

    #[test]
    fn forces_replace_previous_step() {
        let mut app = create_test_app();
        let entity = app
            .world_mut()
            .spawn((
                ExternalForce {
                    force: Vec3::X,
                    torque: Vec3::ZERO,
                },
                WalkerState::default(),
            ))
            .id();

        for _ in 0..3 {
            app.world_mut()
                .run_system_once(clear_walker_forces)
                .unwrap();
            Rapier3dBackend::apply_force(app.world_mut(), entity, Vec3::NEG_Y * 100.0);
            app.world_mut()
                .run_system_once(apply_walker_forces)
                .unwrap();
        }

        // The external +X force survives; the walker's pull is counted once.
        let force = app.world().get::<ExternalForce>(entity).unwrap().force;
        assert!(force.abs_diff_eq(Vec3::new(1.0, -100.0, 0.0), 1.0e-4));
    }

    #[test]
    fn walker_bundle_creates_valid_entity() {
        let mut app = create_test_app();

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                Rapier3dWalkerBundle::new(),
                Collider::capsule_y(0.5, 0.4),
            ))
            .id();

        assert!(app.world().get::<RigidBody>(entity).is_some());
        assert!(app.world().get::<Velocity>(entity).is_some());
        assert_eq!(app.world().get::<GravityScale>(entity).unwrap().0, 0.0);
        assert!(app.world().get::<LockedAxes>(entity).is_some());
    }
}
