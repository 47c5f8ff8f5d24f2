//! Core controller systems.
//!
//! The look pass ([`apply_look`]) runs once per rendered frame. The surface
//! pass runs once per fixed step as a chain: normal, alignment, pull, run
//! classification, movement, markers. Systems that talk to the physics
//! engine are generic over the backend.

use bevy::prelude::*;

use crate::backend::WalkerPhysicsBackend;
use crate::config::{WalkerConfig, WalkerLinks};
use crate::intent::{LookIntent, WalkIntent};
use crate::speed::SpeedOverrides;
use crate::state::{Running, WalkerState};
use crate::surface;

/// Apply pointer motion: camera pitch and body yaw.
///
/// The camera's local rotation is *set* from the accumulated pitch every
/// frame, so it can never drift or pick up roll. Yaw is composed onto the
/// body's orientation about its own up axis, leaving the other two axes to
/// surface alignment. Zero motion still writes both rotations.
pub fn apply_look(
    time: Res<Time>,
    mut q_walkers: Query<(
        &WalkerConfig,
        &WalkerLinks,
        &mut WalkerState,
        &mut LookIntent,
        &mut Transform,
    )>,
    mut q_cameras: Query<&mut Transform, Without<WalkerState>>,
) {
    let dt = time.delta_secs();

    for (config, links, mut state, mut look, mut transform) in &mut q_walkers {
        let delta = look.take();
        let mouse_x = delta.x * config.mouse_sensitivity * dt;
        let mouse_y = delta.y * config.mouse_sensitivity * dt;

        state.pitch = surface::accumulate_pitch(state.pitch, mouse_y, config.pitch_limit);
        if let Ok(mut camera) = q_cameras.get_mut(links.camera) {
            camera.rotation = surface::pitch_rotation(state.pitch);
        }

        let rotation = surface::apply_yaw(transform.rotation, mouse_x);
        if rotation.is_finite() {
            transform.rotation = rotation;
        } else {
            debug!("Skipping non-finite yaw for mouse_x={mouse_x}");
        }
    }
}

/// Recompute each walker's outward surface normal.
///
/// The sphere center is resolved in world space, so it may sit anywhere in
/// a hierarchy. When the body sits exactly on the sphere center the previous
/// normal is kept. A missing center entity (despawned after attach) does the
/// same.
pub fn update_surface_normal(
    mut q_walkers: Query<(Entity, &Transform, &WalkerLinks, &mut WalkerState)>,
    q_frames: FrameQuery,
) {
    for (entity, transform, links, mut state) in &mut q_walkers {
        let Some(center) = world_position(&q_frames, links.sphere_center) else {
            bevy::log::warn_once!(
                "Sphere center {} of walker {entity} is gone; keeping last normal",
                links.sphere_center
            );
            continue;
        };

        match surface::surface_normal(transform.translation, center) {
            Some(normal) => state.normal = normal,
            None => debug!("Walker {entity} is at its sphere center; keeping last normal"),
        }
    }
}

/// Blend each body's orientation so its up axis tracks the surface normal.
pub fn align_to_surface(
    time: Res<Time<Fixed>>,
    mut q_walkers: Query<(&WalkerConfig, &WalkerState, &mut Transform)>,
) {
    let dt = fixed_delta(&time);

    for (config, state, mut transform) in &mut q_walkers {
        let factor = surface::alignment_factor(config.align_speed, dt);
        let rotation = surface::align_to_normal(transform.rotation, state.normal, factor);
        if rotation.is_finite() {
            transform.rotation = rotation;
        }
    }
}

/// Pull every walker toward its sphere center with a constant force.
pub fn apply_radial_pull<B: WalkerPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, Vec3)> = world
        .query::<(Entity, &WalkerConfig, &WalkerState)>()
        .iter(world)
        .map(|(e, config, state)| (e, -state.normal * config.pull_force))
        .collect();

    for (entity, force) in entities {
        if force.is_finite() {
            B::apply_force(world, entity, force);
        }
    }
}

/// Classify each walker as running or walking for this step.
pub fn resolve_running(mut q_walkers: Query<(&WalkerConfig, Option<&WalkIntent>, &mut WalkerState)>) {
    for (config, intent, mut state) in &mut q_walkers {
        let run_held = intent.is_some_and(|i| i.run_held);
        state.is_running = config.can_run && run_held;
    }
}

/// Turn directional input into a velocity on the tangent plane.
///
/// The tangential part is assigned directly every step; the radial part of
/// the body's current velocity (built up by the pull force) is kept as is.
/// If the camera looks straight along the normal, the last good forward is
/// reused. A non-finite result is never written.
pub fn apply_surface_movement<B: WalkerPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, WalkerConfig, WalkerLinks, WalkIntent, WalkerState, Quat, Option<f32>)> =
        world
            .query::<(
                Entity,
                &WalkerConfig,
                &WalkerLinks,
                Option<&WalkIntent>,
                &WalkerState,
                &Transform,
                Option<&SpeedOverrides>,
            )>()
            .iter(world)
            .map(|(e, config, links, intent, state, transform, overrides)| {
                (
                    e,
                    *config,
                    *links,
                    intent.copied().unwrap_or_default(),
                    *state,
                    transform.rotation,
                    // Evaluated once per step: a consistent snapshot of the top provider.
                    overrides.and_then(SpeedOverrides::top_speed),
                )
            })
            .collect();

    for (entity, config, links, intent, state, body_rotation, override_speed) in entities {
        let normal = state.normal;
        let move_speed = override_speed.unwrap_or(config.base_speed(state.is_running));

        let basis = camera_forward(world, entity, body_rotation, links.camera)
            .and_then(|forward| surface::tangent_basis(forward, normal))
            .unwrap_or_else(|| {
                debug!("Walker {entity}: camera forward is parallel to the normal, reusing last forward");
                surface::fallback_basis(state.forward, normal)
            });

        let direction = basis.direction(intent.horizontal, intent.vertical);
        let tangential = direction * move_speed;
        let current = B::get_velocity(world, entity);
        let velocity = surface::compose_velocity(direction, move_speed, current, normal);

        if velocity.is_finite() {
            B::set_velocity(world, entity, velocity);
        } else {
            debug!("Walker {entity}: skipping non-finite velocity {velocity:?}");
        }

        if let Some(mut state) = world.get_mut::<WalkerState>(entity) {
            state.forward = basis.forward;
            state.move_speed = move_speed;
            state.tangential_velocity = if tangential.is_finite() {
                tangential
            } else {
                Vec3::ZERO
            };
        }
    }
}

/// Sync the [`Running`] marker with the run classification.
pub fn sync_state_markers(
    mut commands: Commands,
    q_walkers: Query<(Entity, &WalkerState, Has<Running>)>,
) {
    for (entity, state, has_running) in &q_walkers {
        if state.is_running && !has_running {
            commands.entity(entity).insert(Running);
        } else if !state.is_running && has_running {
            commands.entity(entity).remove::<Running>();
        }
    }
}

type FrameQuery<'w, 's, 'a> =
    Query<'w, 's, (Option<&'a Transform>, Option<&'a GlobalTransform>, Option<&'a ChildOf>)>;

/// World-space position of an entity.
///
/// Root entities use their local `Transform`, which is already world space
/// and never stale. A child's local translation is carried through its
/// parent's frame.
pub(crate) fn world_position(q_frames: &FrameQuery, entity: Entity) -> Option<Vec3> {
    let (transform, global, parent) = q_frames.get(entity).ok()?;
    match (transform, parent) {
        (Some(t), None) => Some(t.translation),
        (Some(t), Some(parent)) => parent_to_world(q_frames, parent.parent(), t.translation)
            .or_else(|| global.map(GlobalTransform::translation)),
        (None, _) => global.map(GlobalTransform::translation),
    }
}

/// Map a point from `parent`'s local space to world space.
fn parent_to_world(q_frames: &FrameQuery, parent: Entity, point: Vec3) -> Option<Vec3> {
    let (transform, global, grandparent) = q_frames.get(parent).ok()?;
    match (transform, grandparent, global) {
        (Some(t), None, _) => Some(t.transform_point(point)),
        (_, _, Some(g)) => Some(g.transform_point(point)),
        _ => None,
    }
}

/// Deepest camera hierarchy resolved from local transforms.
const MAX_CAMERA_DEPTH: usize = 16;

/// World-space facing of the walker's camera.
///
/// Local rotations are composed up the camera's `ChildOf` chain. Reaching
/// the body substitutes its current (just aligned) rotation, so a camera
/// anywhere below the body never lags the yaw and alignment written this
/// step. Reaching a root gives the world rotation directly. An ancestor
/// without a `Transform` contributes its propagated `GlobalTransform`.
pub(crate) fn camera_forward(
    world: &World,
    body: Entity,
    body_rotation: Quat,
    camera: Entity,
) -> Option<Vec3> {
    let mut rotation = world.get::<Transform>(camera)?.rotation;
    let mut current = camera;

    for _ in 0..MAX_CAMERA_DEPTH {
        let Some(parent) = world.get::<ChildOf>(current).map(ChildOf::parent) else {
            return Some(rotation * Vec3::NEG_Z);
        };
        if parent == body {
            return Some(body_rotation * rotation * Vec3::NEG_Z);
        }
        match world.get::<Transform>(parent) {
            Some(t) => rotation = t.rotation * rotation,
            None => {
                let global = world.get::<GlobalTransform>(parent)?;
                return Some(global.rotation() * rotation * Vec3::NEG_Z);
            }
        }
        current = parent;
    }

    Some(world.get::<GlobalTransform>(camera)?.rotation() * Vec3::NEG_Z)
}

/// Fixed timestep delta, with fallback for testing scenarios.
pub(crate) fn fixed_delta(time: &Time<Fixed>) -> f32 {
    let dt = time.delta_secs();
    if dt > 0.0 {
        dt
    } else {
        time.timestep().as_secs_f32()
    }
}
