//! Alice, the sender.
//!
//! Alice draws a raw key and, per bit, a preparation basis. The qubit she
//! would send is fully described by that (bit, basis) pair:
//! Z/0 -> |0>, Z/1 -> |1>, X/0 -> |+>, X/1 -> |->.

use crate::types::{draw_bases, draw_bits, BasisSequence, BitSequence};
use qkd_env::RandomSource;

/// Generates `n` independent uniform bits for the raw key.
pub fn generate_bits<R: RandomSource + ?Sized>(n: usize, rng: &mut R) -> BitSequence {
    draw_bits(n, rng)
}

/// Generates `n` independent uniform preparation bases.
pub fn generate_bases<R: RandomSource + ?Sized>(n: usize, rng: &mut R) -> BasisSequence {
    draw_bases(n, rng)
}
