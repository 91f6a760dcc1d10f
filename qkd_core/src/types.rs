//! Common types shared by every protocol stage.

use qkd_env::RandomSource;
use serde::{Deserialize, Serialize};

/// Ordered sequence of classical bits, each 0 or 1.
///
/// Index-aligned with every other per-photon sequence of a run.
pub type BitSequence = Vec<u8>;

/// Ordered sequence of preparation/measurement bases.
pub type BasisSequence = Vec<Basis>;

/// One of the two conjugate BB84 bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Rectilinear basis {|0>, |1>}
    Z = 0,
    /// Diagonal basis {|+>, |->}
    X = 1,
}

impl Basis {
    /// Draws a uniform basis from the shared source.
    pub fn random<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        Self::from_bit(rng.next_bit())
    }

    /// Maps a bit to a basis (0 -> Z, anything else -> X).
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Basis::Z
        } else {
            Basis::X
        }
    }
}

impl std::fmt::Display for Basis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Basis::Z => write!(f, "Z"),
            Basis::X => write!(f, "X"),
        }
    }
}

/// Two-valued link classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecurityStatus {
    /// QBER at or below the configured threshold
    Secure,
    /// QBER above the threshold, or no key at all
    Compromised,
}

impl SecurityStatus {
    /// Returns the wire name ("SECURE" / "COMPROMISED").
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityStatus::Secure => "SECURE",
            SecurityStatus::Compromised => "COMPROMISED",
        }
    }

    /// True for a SECURE verdict.
    pub fn is_secure(&self) -> bool {
        matches!(self, SecurityStatus::Secure)
    }
}

impl std::fmt::Display for SecurityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Draws `n` uniform bits in index order.
pub(crate) fn draw_bits<R: RandomSource + ?Sized>(n: usize, rng: &mut R) -> BitSequence {
    (0..n).map(|_| rng.next_bit()).collect()
}

/// Draws `n` uniform bases in index order.
pub(crate) fn draw_bases<R: RandomSource + ?Sized>(n: usize, rng: &mut R) -> BasisSequence {
    (0..n).map(|_| Basis::random(rng)).collect()
}

/// Draws `n` independent Bernoulli(p) trials as `next_unit() < p`.
pub(crate) fn draw_mask<R: RandomSource + ?Sized>(n: usize, p: f64, rng: &mut R) -> Vec<bool> {
    (0..n).map(|_| rng.next_unit() < p).collect()
}

/// Returns the first `max_samples` bits for display.
pub fn sample_bits(bits: &[u8], max_samples: usize) -> Vec<u8> {
    bits.iter().take(max_samples).copied().collect()
}
