//! Information-theoretic entropy used in the security analysis.

use crate::error::{QkdError, Result};

/// Binary Shannon entropy in bits.
///
/// ```text
/// H(p) = -p log2(p) - (1 - p) log2(1 - p)
/// ```
///
/// Uses the continuity convention H(0) = H(1) = 0.
///
/// # Errors
/// `QkdError::ProbabilityOutOfRange` if `p` is outside [0, 1] or NaN.
pub fn binary_entropy(p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(QkdError::ProbabilityOutOfRange(p));
    }

    if p <= 0.0 || p >= 1.0 {
        return Ok(0.0);
    }

    Ok(-p * p.log2() - (1.0 - p) * (1.0 - p).log2())
}
