//! Random source for spawn parameters.
//!
//! Wraps a small fast RNG behind domain helpers so spawn code never touches
//! `rand` directly. Seeded construction keeps every test deterministic.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seedable random source used by the spawn engine.
///
/// ```ignore
/// let mut rng = SpawnRng::seeded(42);
/// let duration = rng.random_duration(10.0, 4.0); // uniform in [6, 14]
/// ```
pub struct SpawnRng {
    rng: SmallRng,
}

impl SpawnRng {
    /// Random source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Deterministic random source for tests and reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        self.rng.gen_range(min..max)
    }

    /// Random u32 in `[min, max]`, both ends inclusive.
    #[inline]
    pub fn random_uint(&mut self, min: u32, max: u32) -> u32 {
        self.rng.gen_range(min..=max)
    }

    /// Roll against a probability in `[0, 1]`.
    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        self.rng.gen::<f32>() < probability
    }

    /// Duration drawn uniformly from `[mean - range, mean + range]`.
    pub fn random_duration(&mut self, mean: f32, range: f32) -> f32 {
        let lo = (mean - range).max(0.0);
        let hi = mean + range;
        self.rng.gen_range(lo..=hi)
    }
}
