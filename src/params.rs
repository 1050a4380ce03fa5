//! Spawn configuration and per-spawn requests.
//!
//! [`SpawnParameters`] is the flat settings surface the host UI writes into
//! (capacity slider, toast shade picker, ghost-mode toggle, tint color).
//! [`SpawnRequest`] is the explicit parameter object for one spawn, with
//! named optional overrides instead of long optional-argument lists.

use crate::animation::CubicBezier;
use glam::Vec3;

/// Scale applied to the whole layout when the screensaver runs inside the
/// 2 m volumetric window instead of the full immersive space.
pub const VOLUMETRIC_RATIO: f32 = 0.15;

/// Where the screensaver is being presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Full mixed-immersion space; geometry at authored scale.
    Immersive,
    /// Bounded volumetric window; geometry scaled by [`VOLUMETRIC_RATIO`].
    Volumetric,
}

impl DisplayMode {
    /// Uniform scale factor the portal layout uses for this mode.
    pub fn scale(self) -> f32 {
        match self {
            DisplayMode::Immersive => 1.0,
            DisplayMode::Volumetric => VOLUMETRIC_RATIO,
        }
    }
}

/// How dark the paired toast slices are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastShade {
    Light,
    Medium,
    Dark,
}

impl ToastShade {
    /// All shades, indexed by the host's darkness-level setting (0..=2).
    pub const ALL: [ToastShade; 3] = [ToastShade::Light, ToastShade::Medium, ToastShade::Dark];

    /// Template name in the content bundle.
    pub fn template_name(self) -> &'static str {
        match self {
            ToastShade::Light => "toast_light",
            ToastShade::Medium => "toast_med",
            ToastShade::Dark => "toast_dark",
        }
    }

    /// Model scale for this shade. The dark slice asset is larger and is
    /// scaled down to match.
    pub fn model_scale(self) -> f32 {
        match self {
            ToastShade::Light => 1.0,
            ToastShade::Medium => 1.0,
            ToastShade::Dark => 0.3,
        }
    }

    fn index(self) -> usize {
        match self {
            ToastShade::Light => 0,
            ToastShade::Medium => 1,
            ToastShade::Dark => 2,
        }
    }
}

/// Which pool an object comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// A winged toaster, the primary flyer.
    Toaster,
    /// A toast slice of the given shade, paired with each toaster.
    Toast(ToastShade),
}

impl ObjectKind {
    /// Dense index for per-kind storage (toaster, then the three shades).
    pub(crate) fn slot_group(self) -> usize {
        match self {
            ObjectKind::Toaster => 0,
            ObjectKind::Toast(shade) => 1 + shade.index(),
        }
    }
}

/// Tunable spawn behavior. Host settings feed directly into this struct;
/// none of the fields derive further behavior.
#[derive(Clone, Debug)]
pub struct SpawnParameters {
    /// Mean flight duration in seconds.
    pub mean_flight_secs: f32,
    /// Flight duration jitter: uniform in `mean ± jitter`.
    pub flight_jitter_secs: f32,
    /// Maximum simultaneous in-flight objects (host slider, 5..=20).
    pub capacity: u32,
    /// Hard cap on primaries started by a single tick.
    pub max_burst: u32,
    /// Probability that a tick's first primary brings a family.
    pub family_probability: f32,
    /// Number of smaller companions in a family.
    pub family_size: u32,
    /// Scale factor for family companions relative to the primary.
    pub companion_scale: f32,
    /// Delay after each primary spawn, in seconds.
    pub primary_stagger_secs: f32,
    /// Delay after each family companion, in seconds.
    pub companion_stagger_secs: f32,
    /// Uniform model scale for toasters.
    pub toaster_scale: f32,
    /// Shade used for paired toast spawns.
    pub toast_shade: ToastShade,
    /// Ghost mode: objects are static and pass through each other.
    pub ghost_mode: bool,
    /// Base-color tint applied to toaster materials (sRGB).
    pub tint: [f32; 3],
    /// Whether background music plays. Configuration only; playback lives
    /// in the host.
    pub music_enabled: bool,
}

impl Default for SpawnParameters {
    fn default() -> Self {
        Self {
            mean_flight_secs: 10.0,
            flight_jitter_secs: 4.0,
            capacity: 10,
            max_burst: 4,
            family_probability: 0.3,
            family_size: 3,
            companion_scale: 0.4,
            primary_stagger_secs: 0.15,
            companion_stagger_secs: 0.05,
            toaster_scale: 0.005,
            toast_shade: ToastShade::Light,
            ghost_mode: true,
            tint: [0.98, 0.9, 0.2],
            music_enabled: true,
        }
    }
}

/// One spawn, fully described.
///
/// Defaults come from the portal layout and RNG; overrides pin endpoints or
/// easing, which is how family companions inherit their parent's start and
/// timing.
#[derive(Clone, Copy, Debug)]
pub struct SpawnRequest {
    /// Which pool to draw from.
    pub kind: ObjectKind,
    /// Uniform model scale.
    pub scale: f32,
    /// Fixed start position; `None` samples the start-portal disc.
    pub start: Option<Vec3>,
    /// Fixed end position; `None` samples the end-portal disc.
    pub end: Option<Vec3>,
    /// Shared easing curve; `None` draws a fresh random curve.
    pub timing: Option<CubicBezier>,
    /// Start of the previously spawned primary; sampled starts keep a
    /// minimum distance from it.
    pub prev_location: Option<Vec3>,
    /// Family companions to schedule after this spawn executes.
    pub companions: u32,
    /// Primaries of this tick's batch still to be chained after this one.
    pub remaining_primaries: u32,
    /// Whether a paired toast follows this spawn.
    pub paired_toast: bool,
}

impl SpawnRequest {
    /// A primary toaster spawn with no overrides.
    pub fn toaster(scale: f32) -> Self {
        Self {
            kind: ObjectKind::Toaster,
            scale,
            start: None,
            end: None,
            timing: None,
            prev_location: None,
            companions: 0,
            remaining_primaries: 0,
            paired_toast: false,
        }
    }

    /// A paired toast spawn of the given shade.
    pub fn toast(shade: ToastShade) -> Self {
        Self {
            kind: ObjectKind::Toast(shade),
            scale: shade.model_scale(),
            start: None,
            end: None,
            timing: None,
            prev_location: None,
            companions: 0,
            remaining_primaries: 0,
            paired_toast: false,
        }
    }

    /// Pin the start position.
    pub fn with_start(mut self, start: Vec3) -> Self {
        self.start = Some(start);
        self
    }

    /// Pin the end position.
    pub fn with_end(mut self, end: Vec3) -> Self {
        self.end = Some(end);
        self
    }

    /// Share an easing curve with this spawn.
    pub fn with_timing(mut self, timing: CubicBezier) -> Self {
        self.timing = Some(timing);
        self
    }
}
