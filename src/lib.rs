//! # flyby - procedural spawn-and-animate engine
//!
//! A headless engine for portal screensavers in the style of the classic
//! flying-toaster scene: objects pool-spawn on a disc at a start portal,
//! fly eased paths to an end portal, lurch onto a moon and orbit it until
//! they are recycled.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flyby::prelude::*;
//!
//! fn main() -> Result<(), AssetError> {
//!     let mut engine = SpawnEngine::new(
//!         Box::new(StaticAssets::standard()),
//!         RecordingScene::new(),
//!         SpawnParameters::default(),
//!     )?;
//!
//!     let mut clock = SessionClock::manual();
//!     engine.start(clock.now());
//!     for _ in 0..60 {
//!         clock.advance(1.0);
//!         engine.update(clock.now());
//!     }
//!     println!("{} objects in flight", engine.in_flight());
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The engine
//!
//! [`SpawnEngine`] is the central context: it owns the object pool, the
//! portal layout, the RNG and a deterministic delay queue. The host calls
//! [`SpawnEngine::update`] with the current session time in seconds; the
//! engine never reads a clock of its own, so a seeded engine replays the
//! same session from the same timestamps.
//!
//! ### The scene seam
//!
//! All rendering goes through the [`SceneGraph`] trait. [`RecordingScene`]
//! is the headless implementation used in tests and demos; a real host
//! implements the trait over its renderer. Assets come from an
//! [`AssetProvider`]; [`StaticAssets`] serves templates from memory.
//!
//! ### Spawning
//!
//! A once-per-second tick sizes a batch against capacity, then each
//! executed spawn chains its own follow-ups (family companions, the paired
//! toast, the next primary of the batch) through the delay queue at
//! staggered offsets. [`SpawnParameters`] holds every tunable.
//!
//! ### Sessions
//!
//! [`SessionState`] owns the idle countdown and the running flag, and asks
//! an [`ImmersiveHost`] to open or dismiss the immersive space.

pub mod animation;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod lifecycle;
pub mod params;
pub mod pool;
pub mod portal;
pub mod random;
pub mod scene;
pub mod session;
pub mod time;

pub use animation::{compose_toast_plan, compose_toaster_plan, AnimationPlan, CubicBezier};
pub use engine::SpawnEngine;
pub use error::{AssetError, SessionError};
pub use geometry::Transform;
pub use glam::{Quat, Vec2, Vec3};
pub use params::{DisplayMode, ObjectKind, SpawnParameters, SpawnRequest, ToastShade};
pub use pool::{ObjectPool, SlotHandle};
pub use portal::PortalRegistry;
pub use random::SpawnRng;
pub use scene::{
    AssetProvider, ContainerId, MaterialValue, PhysicsMode, RecordingScene, SceneGraph,
    StaticAssets, Template,
};
pub use session::{ImmersiveHost, SessionState, UnsupportedHost};
pub use time::SessionClock;

/// Everything a host needs in one import.
///
/// ```
/// use flyby::prelude::*;
/// ```
pub mod prelude {
    pub use crate::animation::{AnimationPlan, CubicBezier};
    pub use crate::engine::SpawnEngine;
    pub use crate::error::{AssetError, SessionError};
    pub use crate::geometry::Transform;
    pub use crate::params::{DisplayMode, ObjectKind, SpawnParameters, SpawnRequest, ToastShade};
    pub use crate::portal::PortalRegistry;
    pub use crate::random::SpawnRng;
    pub use crate::scene::{
        AssetProvider, ContainerId, MaterialValue, PhysicsMode, RecordingScene, SceneGraph,
        StaticAssets, Template,
    };
    pub use crate::session::{ImmersiveHost, SessionState, UnsupportedHost};
    pub use crate::time::SessionClock;
    pub use glam::{Quat, Vec2, Vec3};
}
