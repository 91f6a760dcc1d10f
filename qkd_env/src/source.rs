//! Core randomness trait shared by every protocol stage.

use crate::{OsEntropySource, SeededSource};

/// The central interface for drawing randomness.
///
/// Alice, Eve, the channel and Bob all consume the same handle, strictly
/// in stage order. Implementations must never be shared between runs.
///
/// # Implementations
///
/// - **Simulation**: `SeededSource` - ChaCha8 from a 64-bit seed
/// - **Production**: `OsEntropySource` - OS-seeded, not reproducible
pub trait RandomSource: Send {
    /// Draws a uniform bit in {0, 1}.
    fn next_bit(&mut self) -> u8;

    /// Draws a uniform real in [0, 1).
    fn next_unit(&mut self) -> f64;

    /// Returns the seed this source was built from (for logging/replay).
    ///
    /// Unseeded sources return `None`.
    fn seed(&self) -> Option<u64>;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_bit(&mut self) -> u8 {
        (**self).next_bit()
    }

    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }

    fn seed(&self) -> Option<u64> {
        (**self).seed()
    }
}

/// Builds the source for a run: seeded when a seed is given, OS-seeded otherwise.
pub fn source_for(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(SeededSource::new(seed)),
        None => Box::new(OsEntropySource::new()),
    }
}
