//! Simulation parameters.

use crate::error::{QkdError, Result};
use serde::{Deserialize, Serialize};

/// Minimum number of emitted photons per run.
pub const MIN_PHOTONS: usize = 100;

/// Maximum number of emitted photons per run.
pub const MAX_PHOTONS: usize = 10_000_000;

/// Default operational QBER threshold (one-way BB84 limit ~= 11%).
pub const DEFAULT_QBER_THRESHOLD: f64 = 0.11;

/// Configuration for one BB84 run.
///
/// Immutable once validated. Construct with [`SimulationParameters::builder`]
/// or deserialize and call [`SimulationParameters::validate`]. When
/// deserializing, `photons` is required and every other field falls back to
/// its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Total photons Alice emits
    pub photons: usize,

    /// Fiber link length in km
    #[serde(default)]
    pub distance_km: f64,

    /// Fiber attenuation coefficient alpha in dB/km
    #[serde(default = "default_attenuation")]
    pub attenuation_db_per_km: f64,

    /// Independent bit-flip probability per measured photon
    #[serde(default)]
    pub noise: f64,

    /// Single-photon detector efficiency eta
    #[serde(default = "default_detector_efficiency")]
    pub detector_efficiency: f64,

    /// Whether Eve runs the intercept-resend attack
    #[serde(default)]
    pub eve_enabled: bool,

    /// Probability that Eve intercepts any given photon
    #[serde(default)]
    pub eve_probability: f64,

    /// Maximum tolerable QBER for a SECURE verdict
    #[serde(default = "default_qber_threshold")]
    pub qber_threshold: f64,

    /// Error-correction inefficiency f_EC (1.0 = Shannon limit)
    #[serde(default = "default_ec_efficiency")]
    pub ec_efficiency: f64,

    /// Seed for reproducibility (None = OS entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_attenuation() -> f64 {
    0.2
}

fn default_detector_efficiency() -> f64 {
    1.0
}

fn default_qber_threshold() -> f64 {
    DEFAULT_QBER_THRESHOLD
}

fn default_ec_efficiency() -> f64 {
    1.0
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            photons: 10_000,
            distance_km: 0.0,
            attenuation_db_per_km: default_attenuation(),
            noise: 0.0,
            detector_efficiency: default_detector_efficiency(),
            eve_enabled: false,
            eve_probability: 0.0,
            qber_threshold: default_qber_threshold(),
            ec_efficiency: default_ec_efficiency(),
            seed: None,
        }
    }
}

impl SimulationParameters {
    /// Starts a builder with default values for everything but the photon count.
    pub fn builder(photons: usize) -> SimulationParametersBuilder {
        SimulationParametersBuilder {
            params: Self {
                photons,
                ..Default::default()
            },
        }
    }

    /// Checks every field against its documented range.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PHOTONS..=MAX_PHOTONS).contains(&self.photons) {
            return Err(QkdError::invalid(
                "photons",
                self.photons,
                "100 <= photons <= 10000000",
            ));
        }
        check_range("distance_km", self.distance_km, 0.0, 1000.0, "0 <= km <= 1000")?;
        check_range(
            "attenuation_db_per_km",
            self.attenuation_db_per_km,
            0.0,
            10.0,
            "0 <= dB/km <= 10",
        )?;
        check_range("noise", self.noise, 0.0, 0.5, "0 <= noise <= 0.5")?;
        if !(self.detector_efficiency > 0.0 && self.detector_efficiency <= 1.0) {
            return Err(QkdError::invalid(
                "detector_efficiency",
                self.detector_efficiency,
                "0 < eta <= 1",
            ));
        }
        check_range("eve_probability", self.eve_probability, 0.0, 1.0, "0 <= p <= 1")?;
        if !(self.qber_threshold > 0.0 && self.qber_threshold <= 0.5) {
            return Err(QkdError::invalid(
                "qber_threshold",
                self.qber_threshold,
                "0 < threshold <= 0.5",
            ));
        }
        check_range("ec_efficiency", self.ec_efficiency, 1.0, 2.0, "1 <= f_EC <= 2")?;
        Ok(())
    }

    /// Interception probability actually applied (0 when Eve is disabled).
    pub fn effective_eve_probability(&self) -> f64 {
        if self.eve_enabled {
            self.eve_probability
        } else {
            0.0
        }
    }
}

fn check_range(name: &'static str, value: f64, lo: f64, hi: f64, expected: &'static str) -> Result<()> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(QkdError::invalid(name, value, expected))
    }
}

/// Builder for [`SimulationParameters`].
#[derive(Debug, Clone)]
pub struct SimulationParametersBuilder {
    params: SimulationParameters,
}

impl SimulationParametersBuilder {
    /// Sets the link length in km.
    pub fn distance_km(mut self, km: f64) -> Self {
        self.params.distance_km = km;
        self
    }

    /// Sets the fiber attenuation in dB/km.
    pub fn attenuation(mut self, db_per_km: f64) -> Self {
        self.params.attenuation_db_per_km = db_per_km;
        self
    }

    /// Sets the bit-flip noise probability.
    pub fn noise(mut self, noise: f64) -> Self {
        self.params.noise = noise;
        self
    }

    /// Sets the detector efficiency eta.
    pub fn detector_efficiency(mut self, eta: f64) -> Self {
        self.params.detector_efficiency = eta;
        self
    }

    /// Enables Eve with the given interception probability.
    pub fn eve(mut self, probability: f64) -> Self {
        self.params.eve_enabled = true;
        self.params.eve_probability = probability;
        self
    }

    /// Turns the attack on or off without touching its probability.
    pub fn eve_enabled(mut self, enabled: bool) -> Self {
        self.params.eve_enabled = enabled;
        self
    }

    /// Sets the QBER threshold for a SECURE verdict.
    pub fn qber_threshold(mut self, threshold: f64) -> Self {
        self.params.qber_threshold = threshold;
        self
    }

    /// Sets the error-correction inefficiency f_EC.
    pub fn ec_efficiency(mut self, f_ec: f64) -> Self {
        self.params.ec_efficiency = f_ec;
        self
    }

    /// Sets the seed (None = OS entropy).
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.params.seed = seed;
        self
    }

    /// Validates and returns the parameters.
    pub fn build(self) -> Result<SimulationParameters> {
        self.params.validate()?;
        Ok(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let params = SimulationParameters::builder(1000).build().unwrap();

        assert_eq!(params.photons, 1000);
        assert_eq!(params.attenuation_db_per_km, 0.2);
        assert_eq!(params.qber_threshold, 0.11);
        assert_eq!(params.ec_efficiency, 1.0);
        assert!(!params.eve_enabled);
        assert_eq!(params.seed, None);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(SimulationParameters::builder(99).build().is_err());
        assert!(SimulationParameters::builder(MAX_PHOTONS + 1).build().is_err());
        assert!(SimulationParameters::builder(1000).distance_km(-1.0).build().is_err());
        assert!(SimulationParameters::builder(1000).attenuation(11.0).build().is_err());
        assert!(SimulationParameters::builder(1000).noise(0.51).build().is_err());
        assert!(SimulationParameters::builder(1000).detector_efficiency(0.0).build().is_err());
        assert!(SimulationParameters::builder(1000).eve(1.01).build().is_err());
        assert!(SimulationParameters::builder(1000).qber_threshold(0.0).build().is_err());
        assert!(SimulationParameters::builder(1000).ec_efficiency(0.9).build().is_err());
    }

    #[test]
    fn test_rejects_nan() {
        let err = SimulationParameters::builder(1000)
            .noise(f64::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, QkdError::InvalidParameter { name: "noise", .. }));
        assert!(SimulationParameters::builder(1000)
            .detector_efficiency(f64::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn test_effective_eve_probability() {
        let mut params = SimulationParameters::builder(1000).eve(0.5).build().unwrap();
        assert_eq!(params.effective_eve_probability(), 0.5);

        params.eve_enabled = false;
        assert_eq!(params.effective_eve_probability(), 0.0);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let params: SimulationParameters =
            serde_json::from_str(r#"{"photons": 5000, "noise": 0.02, "seed": 7}"#).unwrap();

        assert_eq!(params.photons, 5000);
        assert_eq!(params.noise, 0.02);
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.detector_efficiency, 1.0);
        assert_eq!(params.attenuation_db_per_km, 0.2);
        assert_eq!(params.qber_threshold, DEFAULT_QBER_THRESHOLD);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_deserialize_requires_photons() {
        let err = serde_json::from_str::<SimulationParameters>(r#"{"distance_km": 50.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("photons"), "{}", err);
    }
}
