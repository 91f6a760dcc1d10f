//! Privacy amplification estimates.
//!
//! Asymptotic one-way post-processing bound with an error-correction
//! inefficiency `f_EC >= 1`:
//!
//! ```text
//! SKR = R_sifted * max(0, 1 - H(Q) - f_EC * H(Q))
//! ```
//!
//! At `f_EC = 1` this is the Shor-Preskill rate `R_sifted * (1 - 2 H(Q))`,
//! which reaches zero near Q ~= 11%. Real Cascade/LDPC codes run at
//! `f_EC ~= 1.1-1.2`. No hashing is performed, only the rate is estimated.

use crate::entropy::binary_entropy;
use crate::error::{QkdError, Result};
use crate::types::SecurityStatus;

/// Fraction of sifted bits that survive error correction and amplification.
///
/// Never negative.
///
/// # Errors
/// - `ProbabilityOutOfRange` if `qber` is outside [0, 1]
/// - `InvalidParameter` if `ec_efficiency` is below 1 or NaN
pub fn secure_fraction(qber: f64, ec_efficiency: f64) -> Result<f64> {
    if ec_efficiency.is_nan() || ec_efficiency < 1.0 {
        return Err(QkdError::invalid("ec_efficiency", ec_efficiency, "f_EC >= 1"));
    }
    let h = binary_entropy(qber)?;
    Ok((1.0 - (1.0 + ec_efficiency) * h).max(0.0))
}

/// Secret key rate in secure bits per emitted photon.
///
/// # Errors
/// - `InvalidParameter` if `sifted_fraction` is outside [0, 1] or
///   `ec_efficiency` is below 1
/// - `ProbabilityOutOfRange` if `qber` is outside [0, 1]
pub fn secret_key_rate(sifted_fraction: f64, qber: f64, ec_efficiency: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&sifted_fraction) {
        return Err(QkdError::invalid(
            "sifted_fraction",
            sifted_fraction,
            "0 <= fraction <= 1",
        ));
    }
    Ok(sifted_fraction * secure_fraction(qber, ec_efficiency)?)
}

/// Estimated final key length after privacy amplification, floored.
pub fn estimate_final_key_length(
    sifted_length: usize,
    qber: f64,
    ec_efficiency: f64,
) -> Result<usize> {
    let fraction = secure_fraction(qber, ec_efficiency)?;
    Ok((sifted_length as f64 * fraction).floor() as usize)
}

/// SECURE iff `qber <= threshold`. Pure comparison, no hysteresis.
pub fn evaluate_security(qber: f64, threshold: f64) -> SecurityStatus {
    if qber <= threshold {
        SecurityStatus::Secure
    } else {
        SecurityStatus::Compromised
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_skr_perfect_channel() {
        assert_relative_eq!(secret_key_rate(0.5, 0.0, 1.0).unwrap(), 0.5);
    }

    #[test]
    fn test_skr_shor_preskill_reduction() {
        let q = 0.05;
        let h = binary_entropy(q).unwrap();
        assert_relative_eq!(
            secret_key_rate(0.4, q, 1.0).unwrap(),
            0.4 * (1.0 - 2.0 * h),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_skr_zero_beyond_break_even() {
        assert_eq!(secret_key_rate(0.5, 0.12, 1.0).unwrap(), 0.0);
        assert_eq!(secret_key_rate(0.5, 0.25, 1.0).unwrap(), 0.0);
        assert_eq!(secret_key_rate(0.5, 0.5, 1.0).unwrap(), 0.0);
        // Still positive just below ~11%
        assert!(secret_key_rate(0.5, 0.10, 1.0).unwrap() > 0.0);
    }

    #[test]
    fn test_skr_never_negative() {
        for i in 0..=100 {
            let q = i as f64 / 100.0;
            for f in [1.0, 1.16, 1.5, 2.0] {
                assert!(secret_key_rate(1.0, q, f).unwrap() >= 0.0);
            }
        }
    }

    #[test]
    fn test_ec_inefficiency_lowers_rate() {
        let ideal = secret_key_rate(0.5, 0.03, 1.0).unwrap();
        let cascade = secret_key_rate(0.5, 0.03, 1.16).unwrap();
        assert!(cascade < ideal);
    }

    #[test]
    fn test_final_key_length_floors() {
        assert_eq!(estimate_final_key_length(1001, 0.0, 1.0).unwrap(), 1001);
        assert_eq!(estimate_final_key_length(1000, 0.2, 1.0).unwrap(), 0);

        let q = 0.02;
        let expected = (1000.0 * (1.0 - 2.0 * binary_entropy(q).unwrap())).floor() as usize;
        assert_eq!(estimate_final_key_length(1000, q, 1.0).unwrap(), expected);
    }

    #[test]
    fn test_rejects_invalid_qber() {
        assert!(secret_key_rate(0.5, 1.2, 1.0).is_err());
        assert!(estimate_final_key_length(10, -0.1, 1.0).is_err());
    }

    #[test]
    fn test_rejects_invalid_sifted_fraction() {
        for frac in [-0.5, 1.5, f64::NAN] {
            let err = secret_key_rate(frac, 0.0, 1.0).unwrap_err();
            assert!(matches!(
                err,
                QkdError::InvalidParameter { name: "sifted_fraction", .. }
            ));
        }
        assert_eq!(secret_key_rate(1.0, 0.0, 1.0).unwrap(), 1.0);
        assert_eq!(secret_key_rate(0.0, 0.0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_invalid_ec_efficiency() {
        // Below the Shannon limit the rate would stay positive past break-even
        for f_ec in [0.0, 0.99, f64::NAN] {
            assert!(matches!(
                secret_key_rate(0.5, 0.12, f_ec),
                Err(QkdError::InvalidParameter { name: "ec_efficiency", .. })
            ));
            assert!(matches!(
                estimate_final_key_length(1000, 0.12, f_ec),
                Err(QkdError::InvalidParameter { name: "ec_efficiency", .. })
            ));
        }
        assert!(secure_fraction(0.05, f64::NAN).is_err());
    }

    #[test]
    fn test_evaluate_security_threshold_inclusive() {
        assert_eq!(evaluate_security(0.11, 0.11), SecurityStatus::Secure);
        assert_eq!(evaluate_security(0.0, 0.11), SecurityStatus::Secure);
        assert_eq!(evaluate_security(0.1101, 0.11), SecurityStatus::Compromised);
    }
}
