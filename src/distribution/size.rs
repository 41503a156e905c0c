//! Uniform size sampler
//!
//! Uses the xoshiro256++ PRNG, one instance per worker, so workers never
//! contend on a shared generator and a fixed seed replays the same sizes.

use super::SizeRange;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Draws buffer and file sizes from a [`SizeRange`]
pub struct SizeSampler {
    rng: Xoshiro256PlusPlus,
}

impl SizeSampler {
    /// Create a new sampler with random seed
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    /// Create a new sampler with specific seed
    ///
    /// Useful for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Sample a size from `range`
    ///
    /// An empty interval (e.g. `max <= 0` with a negative `min`) yields its
    /// lower bound instead of panicking.
    #[inline]
    pub fn sample(&mut self, range: SizeRange) -> u64 {
        let (lo, hi) = if range.min < 0 {
            (0, range.max)
        } else if range.min == range.max {
            return range.min as u64;
        } else {
            (range.min, range.max)
        };

        if lo >= hi {
            return lo.max(0) as u64;
        }
        self.rng.gen_range(lo..hi) as u64
    }
}

impl Default for SizeSampler {
    fn default() -> Self {
        Self::new()
    }
}
