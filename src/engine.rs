//! The spawn engine: ticks, spawns, and lifecycle of flying objects.
//!
//! [`SpawnEngine`] owns everything the scheduler touches: the object pool,
//! the portal layout, the task queue and the RNG. Hosts drive it with
//! [`SpawnEngine::update`] once per frame, passing the current session time
//! in seconds; the engine never reads a wall clock of its own, so the same
//! seed and the same timestamps always replay the same session.
//!
//! A tick fires once per second while the engine is started. Each tick
//! commits one batch of spawns up front (for capacity accounting) but only
//! schedules the batch's first primary; every executed spawn then schedules
//! its own follow-ups at staggered offsets relative to the moment it was
//! scheduled to fire, so the chain never drifts even when `update` is
//! called at a coarse cadence.

use std::f32::consts::FRAC_PI_4;

use glam::Vec3;
use log::{debug, info, trace, warn};

use crate::animation::{compose_toast_plan, compose_toaster_plan, CubicBezier, LURCH_SECS, ORBIT_SECS};
use crate::error::AssetError;
use crate::geometry::{random_point_on_disc, rotation_between, Transform};
use crate::lifecycle::{Task, TaskQueue};
use crate::params::{DisplayMode, ObjectKind, SpawnParameters, SpawnRequest};
use crate::pool::ObjectPool;
use crate::portal::{Anchor, PortalRegistry};
use crate::random::SpawnRng;
use crate::scene::{
    AssetProvider, ContainerId, MaterialValue, PhysicsMode, SceneGraph, FLAP_CLIP, MOON_TEMPLATE,
    SCENE_NAME,
};

/// Seconds between spawn ticks.
pub const TICK_SECS: f64 = 1.0;

/// Radius of both portal spawn discs, in portal-local meters.
pub const DISC_RADIUS: f32 = 0.75;

/// Minimum distance between consecutive primary start points.
pub const MIN_START_SEPARATION: f32 = 0.5;

/// Resample attempts before accepting a start point that violates the
/// separation minimum.
const MAX_SEPARATION_ATTEMPTS: u32 = 16;

/// Animation blend-in for toasters; short so wings flap almost immediately.
const TOASTER_TRANSITION_SECS: f32 = 0.1;

/// Animation blend-in for toast slices.
const TOAST_TRANSITION_SECS: f32 = 1.0;

/// Central context object: pool, portals, queue, RNG and counters in one
/// place, threaded explicitly instead of living in globals.
pub struct SpawnEngine<S: SceneGraph> {
    scene: S,
    assets: Box<dyn AssetProvider>,
    pool: ObjectPool,
    portals: PortalRegistry,
    params: SpawnParameters,
    queue: TaskQueue,
    rng: SpawnRng,
    in_flight: u32,
    pending_spawns: u32,
    ticking: bool,
    next_tick: f64,
}

impl<S: SceneGraph> SpawnEngine<S> {
    /// Preload the core assets and lay out the portals.
    ///
    /// Fails if the toaster or moon template is missing, or if the toaster
    /// template has no wing-flap clip. Hosts treat this as fatal.
    pub fn new(
        mut assets: Box<dyn AssetProvider>,
        scene: S,
        params: SpawnParameters,
    ) -> Result<Self, AssetError> {
        let pool = ObjectPool::preload(assets.as_mut())?;
        let moon = assets.load_template(MOON_TEMPLATE, SCENE_NAME)?;
        let portals = PortalRegistry::new(moon.bounds);
        info!(
            "engine ready: pool of {} toasters, moon radius {:.3}",
            crate::pool::TOASTER_POOL_SIZE,
            portals.moon_radius()
        );

        Ok(Self {
            scene,
            assets,
            pool,
            portals,
            params,
            queue: TaskQueue::new(),
            rng: SpawnRng::from_entropy(),
            in_flight: 0,
            pending_spawns: 0,
            ticking: false,
            next_tick: 0.0,
        })
    }

    /// Replace the RNG with a seeded one. Sessions replay deterministically
    /// from here on.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SpawnRng::seeded(seed);
    }

    /// Begin ticking. The first tick fires [`TICK_SECS`] after `now`.
    pub fn start(&mut self, now: f64) {
        self.ticking = true;
        self.next_tick = now + TICK_SECS;
        info!("spawn ticking started at t={:.2}", now);
    }

    /// Stop ticking. Already-scheduled tasks still drain, so in-flight
    /// objects land, orbit and get removed normally.
    pub fn stop(&mut self) {
        self.ticking = false;
        info!("spawn ticking stopped");
    }

    /// Whether the tick loop is running.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Advance the engine to `now`: run any ticks that came due, then all
    /// due lifecycle tasks in fire order.
    pub fn update(&mut self, now: f64) {
        if self.ticking {
            while now >= self.next_tick {
                let at = self.next_tick;
                self.next_tick += TICK_SECS;
                self.tick(at);
            }
        }

        while let Some((fired_at, task)) = self.queue.pop_due(now) {
            self.run_task(fired_at, task);
        }

        // The counter and the pool move in lockstep: +1 per attach, -1 per
        // removal or interrupt.
        debug_assert_eq!(self.in_flight as usize, self.pool.in_flight_slots());
    }

    /// Absolute time of the next scheduled event (tick or lifecycle task),
    /// for hosts that sleep between updates. `None` when idle.
    pub fn next_wake(&self) -> Option<f64> {
        let next_task = self.queue.next_fire_at();
        if self.ticking {
            Some(match next_task {
                Some(at) => at.min(self.next_tick),
                None => self.next_tick,
            })
        } else {
            next_task
        }
    }

    /// One scheduler tick: decide the batch size, commit it against
    /// capacity, and schedule the batch's first primary.
    pub fn tick(&mut self, now: f64) {
        let committed = self.in_flight + self.pending_spawns;
        let available = self
            .params
            .capacity
            .saturating_sub(committed)
            .min(self.params.max_burst);
        if available <= 1 {
            trace!(
                "tick t={:.2}: {} in flight + {} pending, holding",
                now,
                self.in_flight,
                self.pending_spawns
            );
            return;
        }

        let amount = self.rng.random_uint(1, available);
        let family = self.rng.chance(self.params.family_probability);
        let companions = if family { self.params.family_size } else { 0 };

        // Primaries each bring a paired toast; companions ride the first.
        self.pending_spawns += amount * 2 + companions;

        let mut request = SpawnRequest::toaster(self.params.toaster_scale);
        request.companions = companions;
        request.remaining_primaries = amount - 1;
        request.paired_toast = true;

        debug!(
            "tick t={:.2}: batch of {} primaries{}",
            now,
            amount,
            if family { " with family" } else { "" }
        );
        self.queue.schedule(now, Task::Spawn(request));
    }

    fn run_task(&mut self, fired_at: f64, task: Task) {
        match task {
            Task::Spawn(request) => self.run_spawn(fired_at, request),
            Task::Reparent(handle) => {
                if !self.pool.is_current(&handle) {
                    return;
                }
                if let Some(name) = self.pool.name_of(&handle).map(str::to_owned) {
                    self.scene
                        .reparent_preserving_world(&name, ContainerId::PortalWorld);
                }
            }
            Task::Remove(handle) => {
                if !self.pool.is_current(&handle) {
                    return;
                }
                if let Some(name) = self.pool.name_of(&handle).map(str::to_owned) {
                    self.scene.remove_overlay_children(&name);
                    self.scene.detach(&name);
                    self.pool.release(&handle);
                    self.in_flight = self.in_flight.saturating_sub(1);
                    trace!("removed {}, {} in flight", name, self.in_flight);
                }
            }
        }
    }

    /// Execute one spawn and schedule its staggered follow-ups.
    fn run_spawn(&mut self, now: f64, request: SpawnRequest) {
        self.pending_spawns = self.pending_spawns.saturating_sub(1);

        if let ObjectKind::Toast(shade) = request.kind {
            if let Err(err) = self.pool.ensure_toast_template(self.assets.as_mut(), shade) {
                warn!("toast spawn abandoned: {}", err);
                return;
            }
        }

        let acquired = self.pool.acquire(request.kind);
        if acquired.interrupted {
            // Slot wrapped around while its previous flight was still
            // going. Cut that flight short; its stale tasks no-op.
            debug!("interrupting {} for reuse", acquired.name);
            self.scene.detach(&acquired.name);
            self.in_flight = self.in_flight.saturating_sub(1);
        }
        if acquired.needs_collision_shapes {
            self.scene.generate_collision_shapes(&acquired.name);
        }
        self.scene.remove_overlay_children(&acquired.name);
        self.scene.set_transform(&acquired.name, Transform::IDENTITY);

        let start = match request.start {
            Some(start) => start,
            None => self.sample_start(request.prev_location),
        };
        let end = match request.end {
            Some(end) => end,
            None => Self::sample_disc(self.portals.end_anchor(), &mut self.rng),
        };
        let duration = self
            .rng
            .random_duration(self.params.mean_flight_secs, self.params.flight_jitter_secs);

        match request.kind {
            ObjectKind::Toaster => {
                let rotation = rotation_between(start, end);
                let easing = request
                    .timing
                    .unwrap_or_else(|| CubicBezier::random(&mut self.rng));
                let plan = compose_toaster_plan(
                    start,
                    end,
                    rotation,
                    request.scale,
                    duration,
                    easing,
                    self.portals.moon_anchor().position,
                    self.portals.moon_radius(),
                );

                self.scene
                    .set_transform(&acquired.name, Transform::new(request.scale, rotation, start));
                self.apply_toaster_materials(&acquired.name);
                self.scene
                    .play_animation(&acquired.name, &plan, TOASTER_TRANSITION_SECS);
                self.scene.play_named_clip(&acquired.name, FLAP_CLIP, true);
                self.apply_physics(&acquired.name);
                self.scene.attach(&acquired.name, ContainerId::SpaceOrigin);
                self.in_flight += 1;

                let landing = now + f64::from(duration);
                self.queue.schedule(landing, Task::Reparent(acquired.handle));
                self.queue.schedule(
                    landing + f64::from(LURCH_SECS + ORBIT_SECS),
                    Task::Remove(acquired.handle),
                );

                self.schedule_followups(now, &request, start, easing);
            }
            ObjectKind::Toast(_) => {
                let rotation =
                    glam::Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), FRAC_PI_4);
                let plan = compose_toast_plan(start, end, rotation, request.scale, duration);

                self.scene
                    .set_transform(&acquired.name, Transform::new(request.scale, rotation, start));
                self.scene.set_material_parameter(
                    &acquired.name,
                    "saturation",
                    MaterialValue::Float(0.0),
                );
                self.scene.set_material_parameter(
                    &acquired.name,
                    "animate_texture",
                    MaterialValue::Bool(false),
                );
                self.scene
                    .play_animation(&acquired.name, &plan, TOAST_TRANSITION_SECS);
                self.apply_physics(&acquired.name);
                self.scene.attach(&acquired.name, ContainerId::SpaceOrigin);
                self.in_flight += 1;

                self.queue
                    .schedule(now + f64::from(duration), Task::Remove(acquired.handle));
            }
        }
    }

    /// Chain companions, the paired toast, and the batch's next primary
    /// behind an executed primary, with staggered relative delays.
    fn schedule_followups(
        &mut self,
        now: f64,
        request: &SpawnRequest,
        start: Vec3,
        easing: CubicBezier,
    ) {
        let mut cursor = now;

        for _ in 0..request.companions {
            cursor += f64::from(self.params.companion_stagger_secs);
            let companion =
                SpawnRequest::toaster(request.scale * self.params.companion_scale)
                    .with_start(start)
                    .with_end(self.portals.end_anchor().position)
                    .with_timing(easing);
            self.queue.schedule(cursor, Task::Spawn(companion));
        }

        if request.paired_toast {
            cursor += f64::from(self.params.primary_stagger_secs);
            let toast = SpawnRequest::toast(self.params.toast_shade);
            self.queue.schedule(cursor, Task::Spawn(toast));
        }

        if request.remaining_primaries > 0 {
            cursor += f64::from(self.params.primary_stagger_secs);
            let mut next = SpawnRequest::toaster(self.params.toaster_scale);
            next.prev_location = Some(start);
            next.remaining_primaries = request.remaining_primaries - 1;
            next.paired_toast = true;
            self.queue.schedule(cursor, Task::Spawn(next));
        }
    }

    /// Sample a start point on the source disc, keeping a minimum distance
    /// from the previous primary's start when one is known.
    fn sample_start(&mut self, prev: Option<Vec3>) -> Vec3 {
        let anchor = *self.portals.start_anchor();
        let mut point = Self::sample_disc(&anchor, &mut self.rng);
        if let Some(prev) = prev {
            let min_separation = MIN_START_SEPARATION * anchor.scale;
            let mut attempts = 0;
            while point.distance(prev) < min_separation && attempts < MAX_SEPARATION_ATTEMPTS {
                point = Self::sample_disc(&anchor, &mut self.rng);
                attempts += 1;
            }
        }
        point
    }

    fn sample_disc(anchor: &Anchor, rng: &mut SpawnRng) -> Vec3 {
        random_point_on_disc(
            anchor.position,
            DISC_RADIUS * anchor.scale,
            anchor.rotation,
            rng,
        )
    }

    fn apply_toaster_materials(&mut self, name: &str) {
        self.scene
            .set_material_parameter(name, "saturation", MaterialValue::Float(0.0));
        self.scene
            .set_material_parameter(name, "animate_texture", MaterialValue::Bool(true));
        self.scene
            .set_material_parameter(name, "base_color", MaterialValue::Color(self.params.tint));
        self.scene
            .set_material_parameter(name, "metallic", MaterialValue::Float(1.0));
        self.scene
            .set_material_parameter(name, "emissive_intensity", MaterialValue::Float(0.0));
    }

    fn apply_physics(&mut self, name: &str) {
        let mode = if self.params.ghost_mode {
            PhysicsMode::Static
        } else {
            PhysicsMode::Dynamic
        };
        self.scene.set_physics_mode(name, mode);
    }

    /// Switch display mode, rescaling the whole portal layout.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.portals.recompute_layout(mode);
        info!("display mode now {:?}", mode);
    }

    /// Objects currently attached and animating.
    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    /// Spawns committed by past ticks but not yet executed.
    pub fn pending_spawns(&self) -> u32 {
        self.pending_spawns
    }

    /// The portal layout.
    pub fn portals(&self) -> &PortalRegistry {
        &self.portals
    }

    /// Spawn tunables.
    pub fn params(&self) -> &SpawnParameters {
        &self.params
    }

    /// Mutable spawn tunables. Changes apply from the next tick.
    pub fn params_mut(&mut self) -> &mut SpawnParameters {
        &mut self.params
    }

    /// The scene collaborator.
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Mutable scene access, for hosts that drive rendering through the
    /// same object.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{RecordingScene, SceneCommand, StaticAssets};

    fn engine(params: SpawnParameters) -> SpawnEngine<RecordingScene> {
        let mut engine = SpawnEngine::new(
            Box::new(StaticAssets::standard()),
            RecordingScene::new(),
            params,
        )
        .unwrap();
        engine.reseed(7);
        engine
    }

    fn solo_params() -> SpawnParameters {
        SpawnParameters {
            family_probability: 0.0,
            flight_jitter_secs: 0.0,
            ..SpawnParameters::default()
        }
    }

    #[test]
    fn test_no_spawns_before_start() {
        let mut engine = engine(solo_params());
        engine.update(10.0);
        assert_eq!(engine.in_flight(), 0);
        assert_eq!(engine.scene().commands().len(), 0);
    }

    #[test]
    fn test_first_tick_spawns_pairs() {
        let mut engine = engine(solo_params());
        engine.start(0.0);
        engine.update(1.0);
        engine.stop();
        // Let the staggered chain from the one tick drain completely.
        engine.update(4.0);

        // Every primary brings a paired toast.
        assert!(engine.in_flight() >= 2);
        assert_eq!(engine.in_flight() % 2, 0);
        assert_eq!(engine.pending_spawns(), 0);
    }

    #[test]
    fn test_objects_removed_after_flight() {
        let mut engine = engine(solo_params());
        engine.start(0.0);
        engine.update(2.0);
        assert!(engine.in_flight() > 0);

        engine.stop();
        // Flights are exactly 10 s (no jitter); lurch + orbit add 6 more.
        engine.update(30.0);
        assert_eq!(engine.in_flight(), 0);
        assert_eq!(
            engine.scene().attached_count(ContainerId::SpaceOrigin),
            0
        );
    }

    #[test]
    fn test_toaster_reparents_into_portal_world() {
        let mut engine = engine(solo_params());
        engine.start(0.0);
        engine.update(2.0);
        engine.stop();

        // Mid lurch: toasters have landed but not yet been removed.
        engine.update(12.0);
        let reparented = engine
            .scene()
            .commands()
            .iter()
            .filter(|c| matches!(c, SceneCommand::Reparent(_, ContainerId::PortalWorld)))
            .count();
        assert!(reparented > 0);
    }

    #[test]
    fn test_capacity_one_never_spawns() {
        let params = SpawnParameters {
            capacity: 1,
            ..SpawnParameters::default()
        };
        let mut engine = engine(params);
        engine.start(0.0);
        engine.update(20.0);

        assert_eq!(engine.in_flight(), 0);
        assert_eq!(engine.scene().commands().len(), 0);
    }

    #[test]
    fn test_capacity_holds_back_ticks() {
        let params = SpawnParameters {
            capacity: 4,
            family_probability: 0.0,
            ..SpawnParameters::default()
        };
        let mut engine = engine(params);
        engine.start(0.0);

        // Flights last 10 s, so nothing lands during these ticks and the
        // committed count can only rise. A tick runs only while committed
        // is at most capacity - 2, and a batch doubles at most what is
        // left, so the total stays under twice the capacity.
        for second in 1..=8 {
            engine.update(f64::from(second) + 0.5);
            assert!(engine.in_flight() + engine.pending_spawns() <= 8);
        }
        assert!(engine.in_flight() >= 2);
    }

    #[test]
    fn test_family_shares_start_and_curve() {
        let params = SpawnParameters {
            family_probability: 1.0,
            ..SpawnParameters::default()
        };
        let mut engine = engine(params);
        engine.start(0.0);
        engine.update(2.0);

        let commands = engine.scene().commands();
        let mut primary_start = None;
        let mut companion_starts = Vec::new();
        for command in commands {
            if let SceneCommand::PlayAnimation(object, plan, _) = command {
                if !object.starts_with("toaster.") {
                    continue;
                }
                let scale = plan.flight.from.scale.x;
                if (scale - 0.005).abs() < 1e-6 && primary_start.is_none() {
                    primary_start = Some(plan.flight.from.translation);
                } else if (scale - 0.002).abs() < 1e-6 {
                    companion_starts.push(plan.flight.from.translation);
                }
            }
        }

        let primary_start = primary_start.expect("a full-size toaster spawned");
        assert_eq!(companion_starts.len(), 3);
        for start in companion_starts {
            assert_eq!(start, primary_start);
        }
    }

    #[test]
    fn test_missing_toast_template_abandons_spawn() {
        let mut assets = StaticAssets::standard();
        assets.remove("toast_light");
        let mut engine = SpawnEngine::new(
            Box::new(assets),
            RecordingScene::new(),
            solo_params(),
        )
        .unwrap();
        engine.reseed(7);
        engine.start(0.0);
        engine.update(1.0);
        engine.stop();
        engine.update(4.0);

        // Toasters fly, toasts are silently skipped.
        assert!(engine.in_flight() > 0);
        assert_eq!(engine.pending_spawns(), 0);
        let toast_attached = engine
            .scene()
            .commands()
            .iter()
            .any(|c| matches!(c, SceneCommand::Attach(object, _) if object.starts_with("toast_")));
        assert!(!toast_attached);
    }

    #[test]
    fn test_toaster_clones_get_collision_shapes_on_first_flight() {
        let mut engine = engine(solo_params());
        engine.start(0.0);
        engine.update(1.0);
        engine.stop();
        engine.update(4.0);

        // Every attached object got its shapes generated before attach.
        let attached: Vec<&String> = engine
            .scene()
            .commands()
            .iter()
            .filter_map(|c| match c {
                SceneCommand::Attach(object, _) => Some(object),
                _ => None,
            })
            .collect();
        assert!(attached.iter().any(|o| o.starts_with("toaster.")));
        for object in attached {
            assert!(
                engine
                    .scene()
                    .commands()
                    .iter()
                    .any(|c| matches!(c, SceneCommand::GenerateCollisionShapes(o) if o == object)),
                "no collision shapes for {}",
                object
            );
        }
    }

    #[test]
    fn test_collision_shapes_generated_once_per_clone() {
        let mut engine = engine(solo_params());
        engine.start(0.0);
        // Several batches; slots recycle after removal from ~17 s on.
        for second in 1..=40 {
            engine.update(f64::from(second));
        }

        let shape_commands: Vec<&String> = engine
            .scene()
            .commands()
            .iter()
            .filter_map(|c| match c {
                SceneCommand::GenerateCollisionShapes(object) => Some(object),
                _ => None,
            })
            .collect();
        let mut unique: Vec<&String> = shape_commands.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(shape_commands.len(), unique.len());
    }

    #[test]
    fn test_next_wake_tracks_tick_and_queue() {
        let mut engine = engine(solo_params());
        assert_eq!(engine.next_wake(), None);

        engine.start(0.0);
        assert_eq!(engine.next_wake(), Some(1.0));

        engine.update(1.0);
        engine.stop();
        // In-flight objects still have lifecycle tasks queued.
        let wake = engine.next_wake().expect("tasks pending");
        assert!(wake > 1.0);

        engine.update(60.0);
        assert_eq!(engine.next_wake(), None);
    }

    #[test]
    fn test_display_mode_rescales_layout() {
        let mut engine = engine(solo_params());
        let immersive = engine.portals().start_anchor().position;
        engine.set_display_mode(DisplayMode::Volumetric);
        let volumetric = engine.portals().start_anchor().position;
        assert!((volumetric - immersive * crate::params::VOLUMETRIC_RATIO).length() < 1e-6);
        engine.set_display_mode(DisplayMode::Immersive);
        assert_eq!(engine.portals().start_anchor().position, immersive);
    }
}
