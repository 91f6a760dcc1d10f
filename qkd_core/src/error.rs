//! Error types for the BB84 simulation core.

use thiserror::Error;

/// Errors raised by the simulation core.
///
/// Only input-domain violations are errors. Degenerate outcomes such as an
/// empty sifted key are valid results and never surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QkdError {
    /// A simulation parameter is outside its documented range
    #[error("Invalid parameter `{name}` = {value}: expected {expected}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A probability argument is outside [0, 1] (or NaN)
    #[error("Probability p must be in [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),

    /// Per-photon sequences handed to a stage disagree in length
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl QkdError {
    /// Creates an invalid-parameter error.
    pub fn invalid(
        name: &'static str,
        value: impl std::fmt::Display,
        expected: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            expected,
        }
    }

    /// Checks that a per-photon sequence has the expected length.
    pub(crate) fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::LengthMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}

/// Result alias for the simulation core.
pub type Result<T> = std::result::Result<T, QkdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = QkdError::invalid("noise", 0.7, "0 <= noise <= 0.5");
        assert_eq!(
            err.to_string(),
            "Invalid parameter `noise` = 0.7: expected 0 <= noise <= 0.5"
        );
    }

    #[test]
    fn test_check_len() {
        assert!(QkdError::check_len("bob_bases", 3, 3).is_ok());

        let err = QkdError::check_len("bob_bases", 3, 2).unwrap_err();
        assert_eq!(
            err,
            QkdError::LengthMismatch {
                what: "bob_bases",
                expected: 3,
                actual: 2
            }
        );
    }
}
