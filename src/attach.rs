//! Walker attachment.
//!
//! Adding a [`WalkerConfig`] to an entity attaches it as a walker. The links
//! are validated right away so a misconfigured walker is reported at spawn
//! time instead of silently doing nothing on its first tick.

use bevy::prelude::*;
use thiserror::Error;

use crate::backend::WalkerPhysicsBackend;
use crate::config::{WalkerConfig, WalkerLinks};
use crate::intent::{LookIntent, WalkIntent};
use crate::speed::SpeedOverrides;
use crate::state::WalkerState;

/// Why a walker could not be attached.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    /// The walker entity has no [`WalkerLinks`].
    #[error("walker {0} has no WalkerLinks")]
    MissingLinks(Entity),
    /// The linked sphere center does not exist or has no transform.
    #[error("sphere center {center} of walker {walker} is missing or has no Transform")]
    MissingSphereCenter { walker: Entity, center: Entity },
    /// The linked camera does not exist or has no transform.
    #[error("camera {camera} of walker {walker} is missing or has no Transform")]
    MissingCamera { walker: Entity, camera: Entity },
    /// The walker body is a child entity.
    ///
    /// Its transform and velocity are read and written as world space, so
    /// the body must be a root.
    #[error("walker {0} has a parent; walker bodies must be root entities")]
    ParentedBody(Entity),
}

/// Triggered on a walker entity once it is attached and ticking.
#[derive(Event, Debug, Clone, Copy)]
pub struct WalkerAttached;

/// Triggered on a walker entity whose attachment was rejected.
///
/// The entity keeps its components but never receives a [`WalkerState`],
/// so no controller system touches it.
#[derive(Event, Debug, Clone, Copy)]
pub struct AttachFailed {
    pub error: AttachError,
}

/// Observer: attach every entity that receives a [`WalkerConfig`].
///
/// The work is queued as a command because preparing the body needs full
/// world access.
pub fn on_walker_added<B: WalkerPhysicsBackend>(
    trigger: Trigger<OnAdd, WalkerConfig>,
    mut commands: Commands,
) {
    let entity = trigger.target();
    commands.queue(move |world: &mut World| attach_walker::<B>(world, entity));
}

/// Validate links, prepare the body and seed the walker's state.
pub fn attach_walker<B: WalkerPhysicsBackend>(world: &mut World, entity: Entity) {
    let Ok(entity_ref) = world.get_entity(entity) else {
        // Despawned before the command ran.
        return;
    };
    if entity_ref.contains::<WalkerState>() {
        return;
    }

    if let Err(error) = validate_links(world, entity) {
        error!("Failed to attach planet walker: {error}");
        world.trigger_targets(AttachFailed { error }, entity);
        return;
    }

    B::prepare_body(world, entity);

    let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
        return;
    };
    let rotation = entity_mut
        .get::<Transform>()
        .map(|t| t.rotation)
        .unwrap_or_default();
    entity_mut.insert(WalkerState::from_rotation(rotation));
    if !entity_mut.contains::<WalkIntent>() {
        entity_mut.insert(WalkIntent::default());
    }
    if !entity_mut.contains::<LookIntent>() {
        entity_mut.insert(LookIntent::default());
    }
    if !entity_mut.contains::<SpeedOverrides>() {
        entity_mut.insert(SpeedOverrides::default());
    }

    debug!("Attached planet walker {entity}");
    world.trigger_targets(WalkerAttached, entity);
}

/// Check that the body is a root and both linked entities exist.
pub fn validate_links(world: &World, entity: Entity) -> Result<WalkerLinks, AttachError> {
    if world.get::<ChildOf>(entity).is_some() {
        return Err(AttachError::ParentedBody(entity));
    }

    let links = world
        .get::<WalkerLinks>(entity)
        .copied()
        .ok_or(AttachError::MissingLinks(entity))?;

    if !has_position(world, links.sphere_center) {
        return Err(AttachError::MissingSphereCenter {
            walker: entity,
            center: links.sphere_center,
        });
    }
    if world.get::<Transform>(links.camera).is_none() {
        return Err(AttachError::MissingCamera {
            walker: entity,
            camera: links.camera,
        });
    }

    Ok(links)
}

fn has_position(world: &World, entity: Entity) -> bool {
    world
        .get_entity(entity)
        .is_ok_and(|e| e.contains::<Transform>() || e.contains::<GlobalTransform>())
}
