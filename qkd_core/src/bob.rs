//! Bob, the receiver.
//!
//! Measurement model for each incoming (post-Eve) state:
//! - Bob's basis matches the state's basis -> deterministic, the state's bit
//! - Bases differ -> uniformly random outcome (complementarity)
//!
//! Independent bit-flip noise is applied afterwards to every outcome,
//! whichever branch produced it.

use crate::error::{QkdError, Result};
use crate::types::{draw_bases, draw_bits, draw_mask, Basis, BasisSequence, BitSequence};
use qkd_env::RandomSource;
use tracing::debug;

/// Generates `n` independent uniform measurement bases.
pub fn generate_bases<R: RandomSource + ?Sized>(n: usize, rng: &mut R) -> BasisSequence {
    draw_bases(n, rng)
}

/// Measures the incoming states in Bob's bases, then applies bit-flip noise.
///
/// Draw order: `n` random outcome bits (used where bases disagree), then,
/// only if `noise > 0`, `n` uniforms for the flip mask.
///
/// # Errors
/// - `InvalidParameter` if `noise` is outside [0, 0.5]
/// - `LengthMismatch` if the three sequences differ in length
pub fn measure<R: RandomSource + ?Sized>(
    effective_bits: &[u8],
    effective_bases: &[Basis],
    bob_bases: &[Basis],
    noise: f64,
    rng: &mut R,
) -> Result<BitSequence> {
    if !(0.0..=0.5).contains(&noise) {
        return Err(QkdError::invalid("noise", noise, "0 <= noise <= 0.5"));
    }
    let n = effective_bits.len();
    QkdError::check_len("effective_bases", n, effective_bases.len())?;
    QkdError::check_len("bob_bases", n, bob_bases.len())?;

    let random_bits = draw_bits(n, rng);
    let mut bob_bits: BitSequence = (0..n)
        .map(|i| {
            if bob_bases[i] == effective_bases[i] {
                effective_bits[i]
            } else {
                random_bits[i]
            }
        })
        .collect();

    if noise > 0.0 {
        let flips = draw_mask(n, noise, rng);
        let mut flipped = 0usize;
        for (bit, flip) in bob_bits.iter_mut().zip(&flips) {
            if *flip {
                *bit ^= 1;
                flipped += 1;
            }
        }
        debug!("bob: noise flipped {}/{} outcomes", flipped, n);
    }

    Ok(bob_bits)
}
