//! Lossy optical channel.
//!
//! Each emitted photon independently reaches Bob's detector and clicks with
//! probability `P_detect = T(alpha, L) * eta`, where the fiber transmittance
//! follows Beer-Lambert in dB:
//!
//! ```text
//! T(alpha, L) = 10^(-alpha * L / 10)
//! ```
//!
//! Typical telecom fiber at 1550 nm has alpha ~= 0.2 dB/km.

use crate::error::{QkdError, Result};
use crate::types::draw_mask;
use qkd_env::RandomSource;
use tracing::debug;

/// Per-photon detection flags, true where Bob's detector clicked.
pub type DetectionMask = Vec<bool>;

/// Fiber transmittance for attenuation `alpha` (dB/km) over `distance` (km).
///
/// Closed form, so very long links decay towards 0.0 instead of going
/// negative or NaN.
pub fn transmittance(alpha: f64, distance: f64) -> f64 {
    10f64.powf(-alpha * distance / 10.0)
}

/// Overall per-photon detection probability `T * eta`.
pub fn detection_probability(alpha: f64, distance: f64, detector_efficiency: f64) -> f64 {
    transmittance(alpha, distance) * detector_efficiency
}

/// Samples `n` independent detection events.
///
/// Draws exactly `n` uniforms from `rng`.
///
/// # Errors
/// `InvalidParameter` if `alpha` or `distance` is negative, or `eta` is
/// outside (0, 1].
pub fn simulate_detection<R: RandomSource + ?Sized>(
    n: usize,
    alpha: f64,
    distance: f64,
    detector_efficiency: f64,
    rng: &mut R,
) -> Result<DetectionMask> {
    if alpha.is_nan() || alpha < 0.0 {
        return Err(QkdError::invalid("attenuation", alpha, "alpha >= 0"));
    }
    if distance.is_nan() || distance < 0.0 {
        return Err(QkdError::invalid("distance", distance, "distance >= 0"));
    }
    if !(detector_efficiency > 0.0 && detector_efficiency <= 1.0) {
        return Err(QkdError::invalid(
            "detector_efficiency",
            detector_efficiency,
            "0 < eta <= 1",
        ));
    }

    let p_detect = detection_probability(alpha, distance, detector_efficiency);
    let detected = draw_mask(n, p_detect, rng);

    debug!(
        "channel: p_detect={:.6}, detected {}/{}",
        p_detect,
        detected.iter().filter(|d| **d).count(),
        n
    );

    Ok(detected)
}
