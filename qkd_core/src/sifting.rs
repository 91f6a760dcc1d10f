//! Basis reconciliation (key sifting).
//!
//! Alice and Bob announce their bases over an authenticated classical
//! channel and keep only positions where the photon was detected and the
//! bases agree. The announcement channel is assumed tamper-proof.

use crate::error::{QkdError, Result};
use crate::types::{Basis, BitSequence};

/// Outcome of key sifting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiftResult {
    /// Alice's bits at surviving positions
    pub alice_sifted: BitSequence,

    /// Bob's bits at surviving positions
    pub bob_sifted: BitSequence,

    /// Which original positions survived (length = photons)
    pub sift_mask: Vec<bool>,

    /// Number of surviving positions
    pub sifted_length: usize,
}

impl SiftResult {
    /// True when no position survived sifting.
    pub fn is_empty(&self) -> bool {
        self.sifted_length == 0
    }
}

/// Keeps position `i` iff `detected[i]` and `alice_bases[i] == bob_bases[i]`.
///
/// # Errors
/// `LengthMismatch` if any input differs in length from `alice_bits`.
pub fn sift(
    alice_bits: &[u8],
    bob_bits: &[u8],
    alice_bases: &[Basis],
    bob_bases: &[Basis],
    detected: &[bool],
) -> Result<SiftResult> {
    let n = alice_bits.len();
    QkdError::check_len("bob_bits", n, bob_bits.len())?;
    QkdError::check_len("alice_bases", n, alice_bases.len())?;
    QkdError::check_len("bob_bases", n, bob_bases.len())?;
    QkdError::check_len("detected", n, detected.len())?;

    let sift_mask: Vec<bool> = (0..n)
        .map(|i| detected[i] && alice_bases[i] == bob_bases[i])
        .collect();

    let mut alice_sifted = Vec::new();
    let mut bob_sifted = Vec::new();
    for (i, keep) in sift_mask.iter().enumerate() {
        if *keep {
            alice_sifted.push(alice_bits[i]);
            bob_sifted.push(bob_bits[i]);
        }
    }

    let sifted_length = alice_sifted.len();

    Ok(SiftResult {
        alice_sifted,
        bob_sifted,
        sift_mask,
        sifted_length,
    })
}
