//! Portal anchor layout.
//!
//! Two portals bracket the flight path: objects emerge from the start
//! portal, cross the room, and leave through the end portal into the portal
//! world where the moon and sun live. Anchor transforms are recomputed
//! whenever the display mode changes; in the volumetric window everything
//! scales down uniformly.

use crate::geometry::rotation_between;
use crate::params::DisplayMode;
use glam::{Quat, Vec3};
use std::f32::consts::PI;

/// Authored position of the start portal, in meters.
pub const SOURCE_POINT: Vec3 = Vec3::new(4.0, 3.0, -8.0);

/// Authored position of the end portal, in meters.
pub const END_POINT: Vec3 = Vec3::new(-3.0, 0.5, -1.0);

/// Offset pulling the moon behind the end portal and pushing the sun past
/// the start portal, applied per-axis.
const BODY_OFFSET: f32 = 0.3;

/// Moon anchor scale at display scale 1.0.
const MOON_SCALE: f32 = 0.75;

/// A named anchor transform in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// World position.
    pub position: Vec3,
    /// Orientation.
    pub rotation: Quat,
    /// Uniform scale.
    pub scale: f32,
}

/// Allowed user-scale range for a portal's drag/scale affordance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AffordanceRange {
    /// Smallest allowed scale magnitude.
    pub min: f32,
    /// Largest allowed scale magnitude.
    pub max: f32,
}

/// The two portal anchors plus the celestial bodies of the portal world.
#[derive(Clone, Debug)]
pub struct PortalRegistry {
    start: Anchor,
    end: Anchor,
    moon: Anchor,
    sun: Anchor,
    affordance: AffordanceRange,
    display_scale: f32,
    moon_base_radius: f32,
}

impl PortalRegistry {
    /// Lay out the portals for immersive display.
    ///
    /// `moon_bounds` are the moon template's bounding half-extents; its X
    /// extent defines the sphere the lurch animation targets.
    pub fn new(moon_bounds: Vec3) -> Self {
        let mut registry = Self {
            start: Anchor {
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: 1.0,
            },
            end: Anchor {
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: 1.0,
            },
            moon: Anchor {
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: MOON_SCALE,
            },
            sun: Anchor {
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: 1.0,
            },
            affordance: AffordanceRange { min: 0.8, max: 100.0 },
            display_scale: 1.0,
            moon_base_radius: moon_bounds.x,
        };
        registry.recompute_layout(DisplayMode::Immersive);
        registry
    }

    /// Reposition both portals and the celestial bodies for a display mode.
    ///
    /// Positions scale by exactly the mode's factor. The start portal faces
    /// the end portal; the end portal faces back along the same axis.
    pub fn recompute_layout(&mut self, mode: DisplayMode) {
        let scale = mode.scale();
        self.display_scale = scale;

        let start = SOURCE_POINT * scale;
        let end = END_POINT * scale;
        let facing = rotation_between(start, end);

        self.start = Anchor {
            position: start,
            rotation: facing,
            scale,
        };

        let (axis, angle) = facing.to_axis_angle();
        self.end = Anchor {
            position: end,
            rotation: Quat::from_axis_angle(axis, angle + PI),
            scale,
        };

        self.moon = Anchor {
            position: (END_POINT - Vec3::splat(BODY_OFFSET)) * scale,
            rotation: Quat::IDENTITY,
            scale: MOON_SCALE * scale,
        };
        self.sun = Anchor {
            position: (SOURCE_POINT + Vec3::splat(BODY_OFFSET)) * scale,
            rotation: Quat::IDENTITY,
            scale,
        };

        self.affordance = AffordanceRange {
            min: 0.8 * scale,
            max: 100.0 * scale,
        };
    }

    /// The portal objects fly out of.
    pub fn start_anchor(&self) -> &Anchor {
        &self.start
    }

    /// The portal objects fly into.
    pub fn end_anchor(&self) -> &Anchor {
        &self.end
    }

    /// The moon in the portal world.
    pub fn moon_anchor(&self) -> &Anchor {
        &self.moon
    }

    /// The sun in the portal world.
    pub fn sun_anchor(&self) -> &Anchor {
        &self.sun
    }

    /// Radius of the moon sphere the lurch animation targets.
    pub fn moon_radius(&self) -> f32 {
        self.moon_base_radius * self.moon.scale
    }

    /// Current display scale factor.
    pub fn display_scale(&self) -> f32 {
        self.display_scale
    }

    /// Allowed scale range for the portals' interaction affordances.
    pub fn affordance_range(&self) -> AffordanceRange {
        self.affordance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LOCAL_FORWARD;
    use crate::params::VOLUMETRIC_RATIO;

    #[test]
    fn test_immersive_layout_uses_authored_points() {
        let registry = PortalRegistry::new(Vec3::ONE);
        assert_eq!(registry.start_anchor().position, SOURCE_POINT);
        assert_eq!(registry.end_anchor().position, END_POINT);
        assert_eq!(registry.display_scale(), 1.0);
    }

    #[test]
    fn test_portals_face_each_other() {
        let registry = PortalRegistry::new(Vec3::ONE);
        let dir = (END_POINT - SOURCE_POINT).normalize();

        let start_facing = registry.start_anchor().rotation * LOCAL_FORWARD;
        assert!(start_facing.dot(dir) > 0.9999);

        let end_facing = registry.end_anchor().rotation * LOCAL_FORWARD;
        assert!(end_facing.dot(dir) < -0.999);
    }

    #[test]
    fn test_volumetric_rescale_is_exact() {
        let mut registry = PortalRegistry::new(Vec3::ONE);
        let start_before = registry.start_anchor().position;
        let end_before = registry.end_anchor().position;

        registry.recompute_layout(DisplayMode::Volumetric);
        let r = VOLUMETRIC_RATIO;

        assert!((registry.start_anchor().position - start_before * r).length() < 1e-6);
        assert!((registry.end_anchor().position - end_before * r).length() < 1e-6);
        assert!((registry.moon_anchor().scale - 0.75 * r).abs() < 1e-6);
        assert!((registry.sun_anchor().scale - r).abs() < 1e-6);

        let affordance = registry.affordance_range();
        assert!((affordance.min - 0.8 * r).abs() < 1e-6);
        assert!((affordance.max - 100.0 * r).abs() < 1e-6);

        // And back again.
        registry.recompute_layout(DisplayMode::Immersive);
        assert_eq!(registry.start_anchor().position, start_before);
    }

    #[test]
    fn test_moon_radius_tracks_scale() {
        let mut registry = PortalRegistry::new(Vec3::new(2.0, 2.0, 2.0));
        assert!((registry.moon_radius() - 2.0 * 0.75).abs() < 1e-6);

        registry.recompute_layout(DisplayMode::Volumetric);
        assert!((registry.moon_radius() - 2.0 * 0.75 * VOLUMETRIC_RATIO).abs() < 1e-6);
    }
}
