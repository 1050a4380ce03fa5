//! The session clock feeding [`crate::SpawnEngine::update`].
//!
//! The engine never reads a wall clock: every entry point takes an explicit
//! `now` in seconds. [`SessionClock`] is the host-side source of that value.
//! It counts seconds since the session opened, excludes time spent paused
//! (flights freeze while the user pins a portal), and has a manual mode
//! where time only moves when the host advances it, which is what demos and
//! deterministic replays use.

use std::time::{Duration, Instant};

enum Source {
    /// Seconds measured from a wall-clock start instant.
    Wall { start: Instant },
    /// Seconds accumulated by explicit `advance` calls.
    Manual { elapsed: f64 },
}

/// Monotonic session time in seconds, with pause support.
pub struct SessionClock {
    source: Source,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl SessionClock {
    /// A clock that follows the wall clock from now on.
    pub fn new() -> Self {
        Self {
            source: Source::Wall {
                start: Instant::now(),
            },
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// A clock that only moves on [`SessionClock::advance`].
    pub fn manual() -> Self {
        Self {
            source: Source::Manual { elapsed: 0.0 },
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Current session time in seconds. Pass this to the engine.
    pub fn now(&self) -> f64 {
        match &self.source {
            Source::Wall { start } => {
                let until = self.paused_at.unwrap_or_else(Instant::now);
                until
                    .duration_since(*start)
                    .saturating_sub(self.paused_total)
                    .as_secs_f64()
            }
            Source::Manual { elapsed } => *elapsed,
        }
    }

    /// Move a manual clock forward. No effect while paused or on a
    /// wall-clock source.
    pub fn advance(&mut self, secs: f64) {
        debug_assert!(secs >= 0.0 && secs.is_finite());
        if self.paused_at.is_some() {
            return;
        }
        if let Source::Manual { elapsed } = &mut self.source {
            *elapsed += secs;
        }
    }

    /// Freeze session time. Idempotent.
    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    /// Resume after a pause; the paused span never reaches the engine.
    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += paused_at.elapsed();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Restart from zero, keeping the source kind.
    pub fn reset(&mut self) {
        self.source = match self.source {
            Source::Wall { .. } => Source::Wall {
                start: Instant::now(),
            },
            Source::Manual { .. } => Source::Manual { elapsed: 0.0 },
        };
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
