//! Deterministic per-generator RNG streams.
//!
//! Each vehicle generator gets its own `SmallRng` seeded by
//!
//!   seed = global_seed XOR (stream * MIXING_CONSTANT)
//!
//! with the 64-bit fractional part of the golden ratio as the mixing
//! constant.  Streams never share state, so adding a generator does not
//! perturb the draws of existing ones.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::GeneratorId;

const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Deterministic RNG owned by one vehicle generator.
pub struct GtuRng(SmallRng);

impl GtuRng {
    /// Seed from the run's global seed and a generator id.
    pub fn for_generator(global_seed: u64, generator: GeneratorId) -> Self {
        let stream = generator.0 as u64 + 1;
        GtuRng(SmallRng::seed_from_u64(global_seed ^ stream.wrapping_mul(MIXING_CONSTANT)))
    }

    /// Expose the inner `SmallRng` for use with `rand_distr` distributions.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
