//! Animation plans for spawned objects.
//!
//! Every spawned object carries one sequential plan of up to three segments:
//!
//! | Segment | Motion | Duration |
//! |---------|--------|----------|
//! | [`FlightSegment`] | eased linear interpolation between portals | randomized |
//! | [`LurchSegment`] | dive onto the moon surface, shrinking | fixed 2 s |
//! | [`OrbitSegment`] | repeating orbit around the moon | 4 s per revolution |
//!
//! The plan is pure data; the rendering collaborator consumes it through
//! [`crate::scene::SceneGraph::play_animation`]. Segment boundaries are
//! continuous: the lurch starts exactly at the flight's end transform and
//! the orbit starts exactly at the lurch's end transform.

use crate::geometry::{rotation_between, Transform};
use crate::random::SpawnRng;
use glam::{Quat, Vec2, Vec3};

/// Seconds the lurch-into-the-moon segment lasts.
pub const LURCH_SECS: f32 = 2.0;

/// Seconds per orbit revolution.
pub const ORBIT_SECS: f32 = 4.0;

/// Scale factor applied during the lurch, shrinking the object as it falls
/// toward the distant moon.
pub const LURCH_SHRINK: f32 = 0.02;

/// Cubic bezier easing curve with both control points in the unit square.
///
/// The implicit endpoints are (0,0) and (1,1); `eval` maps a time fraction
/// to an eased progress fraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    /// First control point.
    pub p1: Vec2,
    /// Second control point.
    pub p2: Vec2,
}

impl CubicBezier {
    /// The identity easing: progress equals time.
    pub const LINEAR: Self = Self {
        p1: Vec2::new(1.0 / 3.0, 1.0 / 3.0),
        p2: Vec2::new(2.0 / 3.0, 2.0 / 3.0),
    };

    /// A curve with both control points drawn uniformly from the unit square.
    pub fn random(rng: &mut SpawnRng) -> Self {
        Self {
            p1: Vec2::new(rng.random(), rng.random()),
            p2: Vec2::new(rng.random(), rng.random()),
        }
    }

    /// One bezier coordinate at parameter `s`, endpoints 0 and 1.
    fn coordinate(c1: f32, c2: f32, s: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * c1 + 3.0 * inv * s * s * c2 + s * s * s
    }

    fn coordinate_derivative(c1: f32, c2: f32, s: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * c1 + 6.0 * inv * s * (c2 - c1) + 3.0 * s * s * (1.0 - c2)
    }

    /// Eased progress for time fraction `t` in `[0, 1]`.
    ///
    /// Solves the curve's x component for the bezier parameter with a few
    /// Newton iterations (bisection fallback when the derivative vanishes),
    /// then samples the y component.
    pub fn eval(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }

        let mut s = t;
        for _ in 0..8 {
            let x = Self::coordinate(self.p1.x, self.p2.x, s) - t;
            if x.abs() < 1e-6 {
                break;
            }
            let dx = Self::coordinate_derivative(self.p1.x, self.p2.x, s);
            if dx.abs() < 1e-6 {
                break;
            }
            s = (s - x / dx).clamp(0.0, 1.0);
        }

        // Refine with bisection if Newton drifted.
        if (Self::coordinate(self.p1.x, self.p2.x, s) - t).abs() > 1e-4 {
            let (mut lo, mut hi) = (0.0f32, 1.0f32);
            for _ in 0..24 {
                s = 0.5 * (lo + hi);
                if Self::coordinate(self.p1.x, self.p2.x, s) < t {
                    lo = s;
                } else {
                    hi = s;
                }
            }
        }

        Self::coordinate(self.p1.y, self.p2.y, s)
    }
}

/// Segment 1: the flight from the start portal to the end portal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightSegment {
    /// Starting transform.
    pub from: Transform,
    /// Ending transform.
    pub to: Transform,
    /// Flight duration in seconds.
    pub duration: f32,
    /// Easing curve applied to the interpolation.
    pub easing: CubicBezier,
}

impl FlightSegment {
    /// Translation at time `t` seconds into the flight.
    pub fn sample_translation(&self, t: f32) -> Vec3 {
        let fraction = self.easing.eval(t / self.duration);
        self.from
            .translation
            .lerp(self.to.translation, fraction)
    }
}

/// Segment 2: the short dive onto the moon surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LurchSegment {
    /// Starting transform. Always equal to the flight's end transform.
    pub from: Transform,
    /// Final transform on the moon surface, shrunk by [`LURCH_SHRINK`].
    pub to: Transform,
    /// Duration in seconds.
    pub duration: f32,
}

/// Segment 3: the indefinite orbit around the moon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitSegment {
    /// Center of the orbit.
    pub center: Vec3,
    /// Transform at the start of each revolution. Equal to the lurch's end.
    pub start: Transform,
    /// Seconds per revolution.
    pub revolution: f32,
    /// Whether the object turns to face along its orbital path.
    pub orient_to_path: bool,
}

/// A complete, sequential animation for one spawned object.
///
/// Toasters get all three segments; toasts only fly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationPlan {
    /// The portal-to-portal flight.
    pub flight: FlightSegment,
    /// The dive onto the moon, if any.
    pub lurch: Option<LurchSegment>,
    /// The repeating orbit, if any.
    pub orbit: Option<OrbitSegment>,
}

impl AnimationPlan {
    /// Total seconds until the object can be removed: the flight, the lurch,
    /// and one full orbit revolution. The orbit itself repeats until removal.
    pub fn total_duration(&self) -> f32 {
        self.flight.duration
            + self.lurch.map_or(0.0, |l| l.duration)
            + self.orbit.map_or(0.0, |o| o.revolution)
    }
}

/// Build the full three-segment toaster plan.
///
/// The lurch targets the closest point on the moon's surface from the flight
/// end, facing the moon, shrunk by [`LURCH_SHRINK`]; the orbit picks up from
/// exactly where the lurch ends.
#[allow(clippy::too_many_arguments)]
pub fn compose_toaster_plan(
    start: Vec3,
    end: Vec3,
    rotation: Quat,
    scale: f32,
    duration: f32,
    easing: CubicBezier,
    moon_center: Vec3,
    moon_radius: f32,
) -> AnimationPlan {
    let from = Transform::new(scale, rotation, start);
    let to = Transform::new(scale, rotation, end);
    let flight = FlightSegment {
        from,
        to,
        duration,
        easing,
    };

    // Closest point on the moon sphere to the flight's end position.
    let offset = end - moon_center;
    let direction = if offset.length_squared() > 1e-12 {
        offset.normalize()
    } else {
        Vec3::Y
    };
    let target = moon_center + direction * moon_radius;

    let final_rotation = rotation_between(end, target);
    let final_transform = Transform::new(scale * LURCH_SHRINK, final_rotation, target);

    let lurch = LurchSegment {
        from: to,
        to: final_transform,
        duration: LURCH_SECS,
    };

    let orbit = OrbitSegment {
        center: moon_center,
        start: final_transform,
        revolution: ORBIT_SECS,
        orient_to_path: true,
    };

    AnimationPlan {
        flight,
        lurch: Some(lurch),
        orbit: Some(orbit),
    }
}

/// Build a flight-only plan for a toast slice.
pub fn compose_toast_plan(
    start: Vec3,
    end: Vec3,
    rotation: Quat,
    scale: f32,
    duration: f32,
) -> AnimationPlan {
    let flight = FlightSegment {
        from: Transform::new(scale, rotation, start),
        to: Transform::new(scale, rotation, end),
        duration,
        easing: CubicBezier::LINEAR,
    };
    AnimationPlan {
        flight,
        lurch: None,
        orbit: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bezier_endpoints() {
        let mut rng = SpawnRng::seeded(5);
        for _ in 0..20 {
            let curve = CubicBezier::random(&mut rng);
            assert_eq!(curve.eval(0.0), 0.0);
            assert_eq!(curve.eval(1.0), 1.0);
        }
    }

    #[test]
    fn test_bezier_linear_is_identity() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((CubicBezier::LINEAR.eval(t) - t).abs() < 1e-3);
        }
    }

    #[test]
    fn test_bezier_stays_in_unit_range_for_unit_controls() {
        let mut rng = SpawnRng::seeded(17);
        for _ in 0..50 {
            let curve = CubicBezier::random(&mut rng);
            for i in 0..=20 {
                let y = curve.eval(i as f32 / 20.0);
                assert!((-0.01..=1.01).contains(&y), "easing out of range: {}", y);
            }
        }
    }

    #[test]
    fn test_plan_segment_continuity() {
        let mut rng = SpawnRng::seeded(2);
        let easing = CubicBezier::random(&mut rng);
        let plan = compose_toaster_plan(
            Vec3::new(4.0, 3.0, -8.0),
            Vec3::new(-3.0, 0.5, -1.0),
            rotation_between(Vec3::new(4.0, 3.0, -8.0), Vec3::new(-3.0, 0.5, -1.0)),
            0.005,
            8.0,
            easing,
            Vec3::new(-3.3, 0.2, -1.3),
            0.75,
        );

        let lurch = plan.lurch.expect("toaster plan has a lurch");
        let orbit = plan.orbit.expect("toaster plan has an orbit");

        // Exact equality at segment boundaries.
        assert_eq!(plan.flight.to, lurch.from);
        assert_eq!(lurch.to, orbit.start);
    }

    #[test]
    fn test_lurch_lands_on_moon_surface() {
        let moon = Vec3::new(-3.3, 0.2, -1.3);
        let radius = 0.75;
        let plan = compose_toaster_plan(
            Vec3::new(4.0, 3.0, -8.0),
            Vec3::new(-3.0, 0.5, -1.0),
            Quat::IDENTITY,
            0.005,
            10.0,
            CubicBezier::LINEAR,
            moon,
            radius,
        );

        let lurch = plan.lurch.unwrap();
        let dist = (lurch.to.translation - moon).length();
        assert!((dist - radius).abs() < 1e-5);
        assert!((lurch.to.scale.x - 0.005 * LURCH_SHRINK).abs() < 1e-9);
    }

    #[test]
    fn test_total_duration() {
        let plan = compose_toaster_plan(
            Vec3::ZERO,
            Vec3::X,
            Quat::IDENTITY,
            1.0,
            7.5,
            CubicBezier::LINEAR,
            Vec3::X * 2.0,
            0.5,
        );
        assert!((plan.total_duration() - (7.5 + LURCH_SECS + ORBIT_SECS)).abs() < 1e-6);

        let toast = compose_toast_plan(Vec3::ZERO, Vec3::X, Quat::IDENTITY, 1.0, 7.5);
        assert!((toast.total_duration() - 7.5).abs() < 1e-6);
    }

    #[test]
    fn test_flight_sampling_respects_easing() {
        let flight = FlightSegment {
            from: Transform::new(1.0, Quat::IDENTITY, Vec3::ZERO),
            to: Transform::new(1.0, Quat::IDENTITY, Vec3::X * 10.0),
            duration: 10.0,
            easing: CubicBezier::LINEAR,
        };
        let mid = flight.sample_translation(5.0);
        assert!((mid.x - 5.0).abs() < 0.05);
    }
}
