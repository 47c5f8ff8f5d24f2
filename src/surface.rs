//! Surface math.
//!
//! Pure functions behind the look and surface passes. Nothing here touches
//! the ECS, so every step of the algorithm can be checked in isolation.
//!
//! # Conventions
//!
//! Bevy is right-handed with `-Z` as forward. Right on the tangent plane is
//! therefore `forward x normal`. Pitch is measured in degrees with positive
//! values looking down, and positive yaw input turns the body to the right.

use bevy::prelude::*;

/// Vectors shorter than this are treated as having no direction.
pub const DEGENERATE_EPSILON: f32 = 1.0e-6;

/// Outward unit normal from `center` through `position`.
///
/// Returns `None` when the two points coincide (or the offset is not finite).
pub fn surface_normal(position: Vec3, center: Vec3) -> Option<Vec3> {
    let offset = position - center;
    if offset.length_squared() < DEGENERATE_EPSILON * DEGENERATE_EPSILON {
        return None;
    }
    offset.try_normalize()
}

/// Slerp parameter for one alignment step, clamped to `[0, 1]`.
///
/// A factor of 1 snaps to the target in a single step; it never overshoots.
#[inline]
pub fn alignment_factor(align_speed: f32, dt: f32) -> f32 {
    let factor = align_speed * dt;
    if factor.is_nan() {
        return 0.0;
    }
    factor.clamp(0.0, 1.0)
}

/// Rotation that carries the body's local up onto `normal`, composed onto
/// `rotation`.
pub fn aligned_target(rotation: Quat, normal: Vec3) -> Quat {
    let up = (rotation * Vec3::Y).normalize();
    Quat::from_rotation_arc(up, normal) * rotation
}

/// Blend `rotation` toward the normal-aligned target by `factor`.
pub fn align_to_normal(rotation: Quat, normal: Vec3, factor: f32) -> Quat {
    let target = aligned_target(rotation, normal);
    rotation.slerp(target, factor).normalize()
}

/// Angle in radians between the body's local up and `normal`.
pub fn up_error(rotation: Quat, normal: Vec3) -> f32 {
    (rotation * Vec3::Y).angle_between(normal)
}

/// Apply one frame of vertical pointer motion to the accumulated pitch.
///
/// The result always lies within `[-limit, limit]`.
pub fn accumulate_pitch(pitch: f32, mouse_y: f32, limit: f32) -> f32 {
    let limit = limit.abs();
    let next = pitch - mouse_y;
    if limit.is_nan() || next.is_nan() {
        // Keep the previous, already clamped value.
        return pitch;
    }
    next.clamp(-limit, limit)
}

/// Camera-local rotation for an accumulated pitch (degrees).
///
/// Pure rotation about the lateral axis; yaw and roll are always zero.
#[inline]
pub fn pitch_rotation(pitch_degrees: f32) -> Quat {
    Quat::from_rotation_x(-pitch_degrees.to_radians())
}

/// Body-local yaw increment for a horizontal pointer motion (degrees).
#[inline]
pub fn yaw_rotation(yaw_degrees: f32) -> Quat {
    Quat::from_rotation_y(-yaw_degrees.to_radians())
}

/// Compose a yaw increment onto the body's existing orientation.
#[inline]
pub fn apply_yaw(rotation: Quat, yaw_degrees: f32) -> Quat {
    (rotation * yaw_rotation(yaw_degrees)).normalize()
}

/// Orthonormal movement axes on the tangent plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentBasis {
    /// Camera facing flattened onto the tangent plane.
    pub forward: Vec3,
    /// `forward x normal`.
    pub right: Vec3,
}

impl TangentBasis {
    /// World-space direction for axis input, normalized or zero.
    ///
    /// Both axes at zero give exactly `Vec3::ZERO`.
    pub fn direction(&self, horizontal: f32, vertical: f32) -> Vec3 {
        (self.right * horizontal + self.forward * vertical).normalize_or_zero()
    }
}

/// Tangent basis from the camera facing.
///
/// Returns `None` when `camera_forward` is (nearly) parallel to `normal`,
/// since the projection then has no usable direction.
pub fn tangent_basis(camera_forward: Vec3, normal: Vec3) -> Option<TangentBasis> {
    let flattened = camera_forward.reject_from_normalized(normal);
    if flattened.length_squared() < DEGENERATE_EPSILON * DEGENERATE_EPSILON {
        return None;
    }
    let forward = flattened.try_normalize()?;
    let right = forward.cross(normal).try_normalize()?;
    Some(TangentBasis { forward, right })
}

/// Basis used when the camera looks straight along the normal.
///
/// Re-projects the last good forward onto the current plane, or falls back
/// to an arbitrary tangent when that is degenerate too.
pub fn fallback_basis(previous_forward: Vec3, normal: Vec3) -> TangentBasis {
    tangent_basis(previous_forward, normal).unwrap_or_else(|| {
        let forward = normal.any_orthonormal_vector();
        TangentBasis {
            forward,
            right: forward.cross(normal),
        }
    })
}

/// Component of `velocity` along `normal`.
#[inline]
pub fn radial_velocity(velocity: Vec3, normal: Vec3) -> Vec3 {
    normal * velocity.dot(normal)
}

/// New linear velocity: input-driven tangential part plus the preserved
/// radial part of the current velocity.
#[inline]
pub fn compose_velocity(direction: Vec3, speed: f32, current: Vec3, normal: Vec3) -> Vec3 {
    direction * speed + radial_velocity(current, normal)
}
