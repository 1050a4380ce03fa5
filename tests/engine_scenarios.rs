//! End-to-end scenarios driven through the public API with a recording
//! scene, checking counts and composed plans over a simulated session.

use flyby::animation::{LURCH_SECS, ORBIT_SECS};
use flyby::params::VOLUMETRIC_RATIO;
use flyby::prelude::*;
use flyby::scene::SceneCommand;

fn new_engine(params: SpawnParameters, seed: u64) -> SpawnEngine<RecordingScene> {
    let mut engine = SpawnEngine::new(
        Box::new(StaticAssets::standard()),
        RecordingScene::new(),
        params,
    )
    .expect("standard assets load");
    engine.reseed(seed);
    engine
}

fn quiet_params() -> SpawnParameters {
    SpawnParameters {
        family_probability: 0.0,
        flight_jitter_secs: 0.0,
        ..SpawnParameters::default()
    }
}

#[test]
fn single_batch_flies_and_lands() {
    let mut engine = new_engine(quiet_params(), 11);
    engine.start(0.0);
    engine.update(1.0);
    engine.stop();

    // Drain the staggered chain of the single tick.
    engine.update(5.0);
    let airborne = engine.in_flight();
    assert!(airborne >= 2, "a batch spawns at least one toaster and toast");
    assert_eq!(airborne % 2, 0);
    assert_eq!(
        engine.scene().attached_count(ContainerId::SpaceOrigin) as u32,
        airborne
    );

    // Flights are exactly 10 s; toasters then lurch and orbit before
    // removal while toasts are removed at flight end.
    let total = 1.0 + 10.0 + f64::from(LURCH_SECS + ORBIT_SECS) + 2.0;
    engine.update(total);
    assert_eq!(engine.in_flight(), 0);
    assert_eq!(engine.scene().attached_count(ContainerId::SpaceOrigin), 0);
    assert_eq!(engine.scene().attached_count(ContainerId::PortalWorld), 0);
}

#[test]
fn toasters_visit_portal_world_before_removal() {
    let mut engine = new_engine(quiet_params(), 11);
    engine.start(0.0);
    engine.update(1.0);
    engine.stop();
    engine.update(5.0);

    // After landing (11 s) but before lurch and orbit finish (17 s).
    engine.update(13.0);
    assert!(engine.scene().attached_count(ContainerId::PortalWorld) > 0);
    assert!(engine.in_flight() > 0);

    engine.update(20.0);
    assert_eq!(engine.in_flight(), 0);
}

#[test]
fn family_companions_share_curve_and_head_for_the_end_portal() {
    let params = SpawnParameters {
        family_probability: 1.0,
        ..SpawnParameters::default()
    };
    let mut engine = new_engine(params, 3);
    engine.start(0.0);
    engine.update(1.0);
    engine.stop();
    engine.update(5.0);

    let end_position = engine.portals().end_anchor().position;
    let mut primary: Option<(Vec3, CubicBezier)> = None;
    let mut companions = Vec::new();
    for command in engine.scene().commands() {
        if let SceneCommand::PlayAnimation(object, plan, _) = command {
            if !object.starts_with("toaster.") {
                continue;
            }
            let scale = plan.flight.from.scale.x;
            if (scale - 0.005).abs() < 1e-6 {
                if primary.is_none() {
                    primary = Some((plan.flight.from.translation, plan.flight.easing));
                }
            } else if (scale - 0.002).abs() < 1e-6 {
                companions.push(plan);
            }
        }
    }

    let (primary_start, primary_easing) = primary.expect("a primary toaster spawned");
    assert_eq!(companions.len(), 3);
    for plan in companions {
        assert_eq!(plan.flight.from.translation, primary_start);
        assert_eq!(plan.flight.easing, primary_easing);
        assert_eq!(plan.flight.to.translation, end_position);
    }
}

#[test]
fn toaster_plans_orbit_the_moon() {
    let mut engine = new_engine(quiet_params(), 5);
    engine.start(0.0);
    engine.update(1.0);
    engine.stop();
    engine.update(5.0);

    let moon = engine.portals().moon_anchor().position;
    let radius = engine.portals().moon_radius();

    let plans = engine.scene().plans_for("toaster.0");
    assert!(!plans.is_empty());
    for plan in plans {
        let lurch = plan.lurch.expect("toasters lurch");
        let orbit = plan.orbit.expect("toasters orbit");
        // Lurch picks up exactly where the flight ends and lands on the
        // moon surface; the orbit picks up where the lurch ends.
        assert_eq!(lurch.from, plan.flight.to);
        assert!((lurch.to.translation.distance(moon) - radius).abs() < 1e-4);
        assert_eq!(orbit.start, lurch.to);
        assert_eq!(orbit.center, moon);
    }
}

#[test]
fn toast_plans_are_flight_only() {
    let mut engine = new_engine(quiet_params(), 5);
    engine.start(0.0);
    engine.update(1.0);
    engine.stop();
    engine.update(5.0);

    let plans = engine.scene().plans_for("toast_light.0");
    assert!(!plans.is_empty());
    for plan in plans {
        assert!(plan.lurch.is_none());
        assert!(plan.orbit.is_none());
        assert_eq!(plan.flight.easing, CubicBezier::LINEAR);
    }
}

#[test]
fn volumetric_mode_rescales_everything_by_the_exact_factor() {
    let mut engine = new_engine(quiet_params(), 1);
    let start = engine.portals().start_anchor().position;
    let moon = engine.portals().moon_anchor().position;
    let affordance = engine.portals().affordance_range();

    engine.set_display_mode(DisplayMode::Volumetric);
    let portals = engine.portals();
    assert!((portals.start_anchor().position - start * VOLUMETRIC_RATIO).length() < 1e-6);
    assert!((portals.moon_anchor().position - moon * VOLUMETRIC_RATIO).length() < 1e-6);
    assert!((portals.affordance_range().min - affordance.min * VOLUMETRIC_RATIO).abs() < 1e-6);
    assert!((portals.affordance_range().max - affordance.max * VOLUMETRIC_RATIO).abs() < 1e-6);

    engine.set_display_mode(DisplayMode::Immersive);
    assert_eq!(engine.portals().start_anchor().position, start);
}

#[test]
fn seeded_sessions_replay_identically() {
    let run = || {
        let mut engine = new_engine(SpawnParameters::default(), 99);
        engine.start(0.0);
        for second in 1..=20 {
            engine.update(f64::from(second));
        }
        engine.scene().commands().to_vec()
    };

    assert_eq!(run(), run());
}

#[test]
fn stopping_drains_without_new_spawns() {
    let mut engine = new_engine(quiet_params(), 8);
    engine.start(0.0);
    engine.update(3.0);
    engine.stop();

    engine.update(60.0);
    assert_eq!(engine.in_flight(), 0);
    assert_eq!(engine.pending_spawns(), 0);
    let commands_after_drain = engine.scene().commands().len();

    // A long idle period adds nothing once the queue is empty.
    engine.update(120.0);
    assert_eq!(engine.scene().commands().len(), commands_after_drain);
}
