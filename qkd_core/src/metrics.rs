//! Key-quality metrics.
//!
//! QBER = mismatched sifted bits / sifted key length. Sources are detector
//! and alignment noise (bit flips) and eavesdropper disturbance.

use crate::error::{QkdError, Result};

/// Computes `(qber, mismatch_count)` over the sifted key pair.
///
/// An empty sifted key yields `(0.0, 0)`: no error information, which the
/// caller must treat as "no key" rather than "perfect key".
///
/// # Errors
/// `LengthMismatch` if the two sifted keys differ in length.
pub fn qber(alice_sifted: &[u8], bob_sifted: &[u8]) -> Result<(f64, usize)> {
    QkdError::check_len("bob_sifted", alice_sifted.len(), bob_sifted.len())?;

    if alice_sifted.is_empty() {
        return Ok((0.0, 0));
    }

    let mismatches = alice_sifted
        .iter()
        .zip(bob_sifted)
        .filter(|(a, b)| a != b)
        .count();

    Ok((mismatches as f64 / alice_sifted.len() as f64, mismatches))
}
