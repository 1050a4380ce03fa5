//! Pure geometry helpers for flight endpoints and facing rotations.
//!
//! Everything here is deterministic given its random source and operates on
//! plain [`glam`] types. Flight endpoints are sampled on discs lying in the
//! portal planes; facing rotations turn the local forward axis toward the
//! flight direction.

use crate::random::SpawnRng;
use glam::{Quat, Vec3};
use std::f32::consts::PI;

/// The local forward axis of every flying model.
///
/// Facing rotations map this axis onto the flight direction.
pub const LOCAL_FORWARD: Vec3 = Vec3::Z;

/// How far sampled disc points are pushed out of the portal plane, in
/// meters, so objects emerge in front of the portal rather than inside it.
pub const DISC_PUSH_OUT: f32 = 0.3;

/// A scale/rotation/translation triple, the unit of every animation segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Per-axis scale.
    pub scale: Vec3,
    /// Orientation.
    pub rotation: Quat,
    /// Position in world space.
    pub translation: Vec3,
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        scale: Vec3::ONE,
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    /// Build a transform with uniform scale.
    pub fn new(scale: f32, rotation: Quat, translation: Vec3) -> Self {
        Self {
            scale: Vec3::splat(scale),
            rotation,
            translation,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rotation that turns [`LOCAL_FORWARD`] to face from `from` toward `to`.
///
/// Axis is the cross product of forward and the normalized direction, angle
/// the arccosine of their dot product. Degenerate inputs never produce NaN:
/// a zero-length or forward-parallel direction yields the identity, an
/// anti-parallel direction yields a half turn about +Y.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    let dir = to - from;
    if dir.length_squared() < 1e-12 {
        return Quat::IDENTITY;
    }
    let dir = dir.normalize();

    let dot = LOCAL_FORWARD.dot(dir).clamp(-1.0, 1.0);
    let axis = LOCAL_FORWARD.cross(dir);

    if axis.length_squared() < 1e-12 {
        // Collinear with forward: either already facing, or facing away.
        if dot > 0.0 {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(Vec3::Y, PI)
        }
    } else {
        Quat::from_axis_angle(axis.normalize(), dot.acos())
    }
}

/// Sample a uniformly distributed point on a disc of `radius` meters.
///
/// The disc lies in the XY plane of the frame given by `rotation`, offset
/// [`DISC_PUSH_OUT`] along local +Z, and is translated to `center`. Radial
/// distance uses `radius * sqrt(u)` so the distribution is uniform by area,
/// not by radius.
pub fn random_point_on_disc(
    center: Vec3,
    radius: f32,
    rotation: Quat,
    rng: &mut SpawnRng,
) -> Vec3 {
    let angle = rng.random_range(0.0, std::f32::consts::TAU);
    let r = radius * rng.random().sqrt();

    let local = Vec3::new(r * angle.cos(), r * angle.sin(), DISC_PUSH_OUT);
    rotation * local + center
}
