//! Eve's intercept-resend attack.
//!
//! Each photon is intercepted independently with probability `p_eve`.
//! Eve measures an intercepted photon in a random basis and resends the
//! state she observed:
//! - Eve's basis matches Alice's -> she learns the bit, no disturbance
//! - Bases differ (probability 1/2) -> her outcome is a coin flip and the
//!   resent state is in the wrong basis
//!
//! In the sifted key Bob then errs with probability 1/2 on those
//! positions, so Eve contributes `p_eve / 4` to the QBER.

use crate::error::{QkdError, Result};
use crate::types::{draw_bases, draw_bits, draw_mask, Basis, BasisSequence, BitSequence};
use qkd_env::RandomSource;
use tracing::debug;

/// Photon stream state after eavesdropping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EveOutcome {
    /// Bit values of the states as they leave Eve
    pub effective_bits: BitSequence,

    /// Bases of the states as they leave Eve
    pub effective_bases: BasisSequence,

    /// Number of photons Eve actually intercepted
    pub intercepted_count: usize,
}

impl EveOutcome {
    /// Untouched stream: copies of Alice's sequences, nothing intercepted.
    pub fn pass_through(alice_bits: &[u8], alice_bases: &[Basis]) -> Self {
        Self {
            effective_bits: alice_bits.to_vec(),
            effective_bases: alice_bases.to_vec(),
            intercepted_count: 0,
        }
    }
}

/// Runs the intercept-resend attack on Alice's photon stream.
///
/// Draw order: `n` interception trials; then, only if at least one photon
/// was intercepted, `n` basis draws for Eve followed by `n` outcome bits.
/// With `p_eve == 0` nothing is drawn at all.
///
/// # Errors
/// - `InvalidParameter` if `p_eve` is outside [0, 1]
/// - `LengthMismatch` if bits and bases differ in length
pub fn intercept_resend<R: RandomSource + ?Sized>(
    alice_bits: &[u8],
    alice_bases: &[Basis],
    p_eve: f64,
    rng: &mut R,
) -> Result<EveOutcome> {
    if !(0.0..=1.0).contains(&p_eve) {
        return Err(QkdError::invalid("eve_probability", p_eve, "0 <= p <= 1"));
    }
    QkdError::check_len("alice_bases", alice_bits.len(), alice_bases.len())?;

    if p_eve == 0.0 {
        return Ok(EveOutcome::pass_through(alice_bits, alice_bases));
    }

    let n = alice_bits.len();
    let intercepted = draw_mask(n, p_eve, rng);
    let intercepted_count = intercepted.iter().filter(|hit| **hit).count();

    if intercepted_count == 0 {
        debug!("eve: no photon intercepted out of {}", n);
        return Ok(EveOutcome::pass_through(alice_bits, alice_bases));
    }

    let eve_bases = draw_bases(n, rng);
    let random_outcomes = draw_bits(n, rng);

    let mut effective_bits = Vec::with_capacity(n);
    let mut effective_bases = Vec::with_capacity(n);

    for i in 0..n {
        if intercepted[i] {
            let measured = if eve_bases[i] == alice_bases[i] {
                alice_bits[i]
            } else {
                random_outcomes[i]
            };
            effective_bits.push(measured);
            effective_bases.push(eve_bases[i]);
        } else {
            effective_bits.push(alice_bits[i]);
            effective_bases.push(alice_bases[i]);
        }
    }

    debug!("eve: intercepted {}/{} photons", intercepted_count, n);

    Ok(EveOutcome {
        effective_bits,
        effective_bases,
        intercepted_count,
    })
}
