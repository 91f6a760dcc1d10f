//! Production random source seeded from OS entropy.

use crate::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Non-reproducible source used when a run carries no seed.
///
/// The generator is seeded once from the operating system; draws after
/// that come from the userspace `StdRng` so large photon batches stay cheap.
#[derive(Debug)]
pub struct OsEntropySource {
    rng: StdRng,
}

impl OsEntropySource {
    /// Creates a new OS-seeded source.
    pub fn new() -> Self {
        tracing::debug!("seeding random source from OS entropy");
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for OsEntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for OsEntropySource {
    fn next_bit(&mut self) -> u8 {
        self.rng.gen_range(0..2u8)
    }

    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn seed(&self) -> Option<u64> {
        // Not seeded
        None
    }
}
