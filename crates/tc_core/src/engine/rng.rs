//! Random source abstraction.
//!
//! All randomness in a run flows through one [`RandomProvider`] owned by
//! the coordinator. With a fixed seed the whole simulation is
//! reproducible: same seed + same request sequence = identical outcomes.
//! The provider is chosen once when the run is set up; it is not safe to
//! swap mid-run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Uniform random draws for combat resolution.
///
/// Single-threaded by design; the simulation owns exactly one provider.
pub trait RandomProvider {
    /// Uniform draw in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;

    /// Uniform integer in `[0, bound)`. `bound` must be non-zero.
    fn next_int(&mut self, bound: u32) -> u32;

    /// Normal draw, used for damage severity spread.
    fn next_normal(&mut self, mean: f64, std_dev: f64) -> f64;
}

/// ChaCha8-backed provider.
///
/// `seeded` gives the deterministic mode used by tests and replays;
/// `from_entropy` gives the default non-deterministic mode.
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: ChaCha8Rng,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: ChaCha8Rng::from_entropy() }
    }
}

impl RandomProvider for SimRng {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    fn next_int(&mut self, bound: u32) -> u32 {
        self.rng.gen_range(0..bound)
    }

    fn next_normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let dist = Normal::new(mean, std_dev).expect("valid normal parameters");
        dist.sample(&mut self.rng)
    }
}
