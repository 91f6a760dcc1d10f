//! Parameter sweeps.
//!
//! Sweeps re-run the core over a linearly spaced grid of one parameter while
//! holding the others fixed. Each grid point is an independent run with its
//! own derived seed:
//! - distance sweep point i -> `base + i`
//! - noise sweep point i -> `base + 1000 + i`
//! - single-parameter sweep point i -> `base + 2000 + i`

use crate::error::{SimError, SimResult};
use qkd_core::{pipeline, SimulationParameters, SimulationResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const NOISE_SEED_OFFSET: u64 = 1000;
const PARAM_SEED_OFFSET: u64 = 2000;

/// One point of a sweep curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Value of the swept parameter
    pub x: f64,

    /// QBER at this point
    pub qber: f64,

    /// Secret key rate at this point
    pub skr: f64,

    /// Sifted key length at this point
    pub sifted_key_length: usize,

    /// Final key length at this point
    pub final_key_length: usize,
}

impl SweepPoint {
    fn from_result(x: f64, result: &SimulationResult) -> Self {
        Self {
            x,
            qber: result.qber,
            skr: result.skr,
            sifted_key_length: result.sifted_key_length,
            final_key_length: result.final_key_length,
        }
    }
}

/// Configuration for the combined distance + noise sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Parameters shared by every point (distance/noise get overridden)
    pub base: SimulationParameters,

    pub distance_min: f64,
    pub distance_max: f64,
    pub distance_steps: usize,

    pub noise_min: f64,
    pub noise_max: f64,
    pub noise_steps: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            base: SimulationParameters {
                photons: 10_000,
                noise: 0.01,
                detector_efficiency: 0.9,
                ..Default::default()
            },
            distance_min: 0.0,
            distance_max: 100.0,
            distance_steps: 20,
            noise_min: 0.0,
            noise_max: 0.15,
            noise_steps: 20,
        }
    }
}

/// Curves produced by [`run_sweep`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// QBER/SKR against distance at fixed noise
    pub distance_sweep: Vec<SweepPoint>,

    /// QBER/SKR against noise at the midpoint distance
    pub noise_sweep: Vec<SweepPoint>,
}

/// Parameters a single-parameter sweep may vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParam {
    Distance,
    Noise,
    Attenuation,
    DetectorEfficiency,
    EveProbability,
}

impl SweepParam {
    /// Returns all sweepable parameters.
    pub fn all() -> Vec<SweepParam> {
        vec![
            SweepParam::Distance,
            SweepParam::Noise,
            SweepParam::Attenuation,
            SweepParam::DetectorEfficiency,
            SweepParam::EveProbability,
        ]
    }

    /// Returns the parameter name.
    pub fn name(&self) -> &'static str {
        match self {
            SweepParam::Distance => "distance",
            SweepParam::Noise => "noise",
            SweepParam::Attenuation => "attenuation",
            SweepParam::DetectorEfficiency => "detector_efficiency",
            SweepParam::EveProbability => "eve_probability",
        }
    }

    /// Returns a copy of `base` with this parameter set to `value`.
    pub fn apply(&self, base: &SimulationParameters, value: f64) -> SimulationParameters {
        let mut params = base.clone();
        match self {
            SweepParam::Distance => params.distance_km = value,
            SweepParam::Noise => params.noise = value,
            SweepParam::Attenuation => params.attenuation_db_per_km = value,
            SweepParam::DetectorEfficiency => params.detector_efficiency = value,
            SweepParam::EveProbability => params.eve_probability = value,
        }
        params
    }
}

impl std::fmt::Display for SweepParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for SweepParam {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distance" | "distance_km" => Ok(SweepParam::Distance),
            "noise" => Ok(SweepParam::Noise),
            "attenuation" | "alpha" => Ok(SweepParam::Attenuation),
            "detector_efficiency" | "eta" => Ok(SweepParam::DetectorEfficiency),
            "eve_probability" | "eve" => Ok(SweepParam::EveProbability),
            _ => Err(format!("Unknown sweep parameter: {}", s)),
        }
    }
}

/// Configuration for a single-parameter sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSweepConfig {
    pub base: SimulationParameters,
    pub param: SweepParam,
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

/// Output of [`run_param_sweep`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSweepReport {
    pub sweep_param: SweepParam,
    pub points: Vec<SweepPoint>,
}

/// `steps` evenly spaced values from `min` to `max` inclusive.
pub fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (steps - 1) as f64;
            (0..steps)
                .map(|i| if i == steps - 1 { max } else { min + step * i as f64 })
                .collect()
        }
    }
}

fn derived_seed(base: Option<u64>, offset: u64) -> Option<u64> {
    base.map(|seed| seed.wrapping_add(offset))
}

fn check_steps(name: &str, steps: usize) -> SimResult<()> {
    if (2..=100).contains(&steps) {
        Ok(())
    } else {
        Err(SimError::invalid(format!(
            "{} must be between 2 and 100, got {}",
            name, steps
        )))
    }
}

/// Runs the distance sweep then the noise sweep.
pub fn run_sweep(config: &SweepConfig) -> SimResult<SweepReport> {
    check_steps("distance_steps", config.distance_steps)?;
    check_steps("noise_steps", config.noise_steps)?;

    let base_seed = config.base.seed;
    info!(
        "Sweeping distance {}..{} km ({} steps) and noise {}..{} ({} steps)",
        config.distance_min,
        config.distance_max,
        config.distance_steps,
        config.noise_min,
        config.noise_max,
        config.noise_steps
    );

    let mut distance_sweep = Vec::with_capacity(config.distance_steps);
    for (i, d) in linspace(config.distance_min, config.distance_max, config.distance_steps)
        .into_iter()
        .enumerate()
    {
        let mut params = SweepParam::Distance.apply(&config.base, d);
        params.seed = derived_seed(base_seed, i as u64);
        let result = pipeline::run_seeded(&params)?;
        debug!("  distance={:.2} km qber={:.4} skr={:.6}", d, result.qber, result.skr);
        distance_sweep.push(SweepPoint::from_result(d, &result));
    }

    let mid_distance = (config.distance_min + config.distance_max) / 2.0;
    let mut noise_sweep = Vec::with_capacity(config.noise_steps);
    for (i, noise) in linspace(config.noise_min, config.noise_max, config.noise_steps)
        .into_iter()
        .enumerate()
    {
        let mut params = SweepParam::Distance.apply(&config.base, mid_distance);
        params.noise = noise;
        params.seed = derived_seed(base_seed, NOISE_SEED_OFFSET + i as u64);
        let result = pipeline::run_seeded(&params)?;
        debug!("  noise={:.4} qber={:.4} skr={:.6}", noise, result.qber, result.skr);
        noise_sweep.push(SweepPoint::from_result(noise, &result));
    }

    Ok(SweepReport {
        distance_sweep,
        noise_sweep,
    })
}

/// Sweeps one parameter while holding the rest of `config.base` fixed.
///
/// Every grid point is validated; an out-of-range point fails the sweep.
pub fn run_param_sweep(config: &ParamSweepConfig) -> SimResult<ParamSweepReport> {
    check_steps("steps", config.steps)?;
    info!(
        "Sweeping {} over {}..{} ({} steps)",
        config.param, config.min, config.max, config.steps
    );

    let mut points = Vec::with_capacity(config.steps);
    for (i, value) in linspace(config.min, config.max, config.steps).into_iter().enumerate() {
        let mut params = config.param.apply(&config.base, value);
        params.seed = derived_seed(config.base.seed, PARAM_SEED_OFFSET + i as u64);
        let result = pipeline::run_seeded(&params)?;
        points.push(SweepPoint::from_result(value, &result));
    }

    Ok(ParamSweepReport {
        sweep_param: config.param,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    proptest::proptest! {
        #[test]
        fn prop_linspace_monotonic(min in 0.0f64..100.0, span in 0.0f64..100.0, steps in 2usize..100) {
            let xs = linspace(min, min + span, steps);
            proptest::prop_assert_eq!(xs.len(), steps);
            proptest::prop_assert_eq!(xs[0], min);
            proptest::prop_assert_eq!(xs[steps - 1], min + span);
            proptest::prop_assert!(xs.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(0.0, 100.0, 5);
        assert_eq!(xs, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(linspace(0.0, 0.15, 20).len(), 20);
        assert_relative_eq!(*linspace(0.0, 0.15, 20).last().unwrap(), 0.15);
    }

    #[test]
    fn test_sweep_param_parse() {
        assert_eq!("distance".parse::<SweepParam>(), Ok(SweepParam::Distance));
        assert_eq!("eta".parse::<SweepParam>(), Ok(SweepParam::DetectorEfficiency));
        assert!("photons".parse::<SweepParam>().is_err());
    }

    #[test]
    fn test_distance_sweep_skr_decreases() {
        let mut config = SweepConfig::default();
        config.base.photons = 20_000;
        config.base.noise = 0.0;
        config.base.seed = Some(42);
        config.distance_steps = 3;
        config.noise_steps = 2;

        let report = run_sweep(&config).unwrap();

        assert_eq!(report.distance_sweep.len(), 3);
        assert_eq!(report.noise_sweep.len(), 2);
        let first = &report.distance_sweep[0];
        let last = &report.distance_sweep[2];
        assert!(first.sifted_key_length > last.sifted_key_length);
        assert!(first.skr > last.skr);
    }

    #[test]
    fn test_sweep_is_reproducible() {
        let config = SweepConfig {
            base: SimulationParameters {
                photons: 2_000,
                seed: Some(7),
                ..SweepConfig::default().base
            },
            distance_steps: 2,
            noise_steps: 2,
            ..Default::default()
        };

        let a = run_sweep(&config).unwrap();
        let b = run_sweep(&config).unwrap();
        assert_eq!(a.distance_sweep, b.distance_sweep);
        assert_eq!(a.noise_sweep, b.noise_sweep);
    }

    #[test]
    fn test_noise_sweep_raises_qber() {
        let config = ParamSweepConfig {
            base: SimulationParameters {
                photons: 50_000,
                attenuation_db_per_km: 0.0,
                seed: Some(3),
                ..Default::default()
            },
            param: SweepParam::Noise,
            min: 0.0,
            max: 0.2,
            steps: 3,
        };

        let report = run_param_sweep(&config).unwrap();

        assert_eq!(report.points[0].qber, 0.0);
        assert!((report.points[2].qber - 0.2).abs() < 0.02);
        assert_eq!(report.points[2].skr, 0.0);
    }

    #[test]
    fn test_param_sweep_rejects_invalid_point() {
        let config = ParamSweepConfig {
            base: SimulationParameters {
                photons: 1_000,
                seed: Some(1),
                ..Default::default()
            },
            param: SweepParam::Noise,
            min: 0.0,
            max: 0.9,
            steps: 3,
        };

        assert!(matches!(run_param_sweep(&config), Err(SimError::Core(_))));
    }

    #[test]
    fn test_rejects_bad_step_count() {
        let config = SweepConfig {
            distance_steps: 1,
            ..Default::default()
        };
        assert!(matches!(run_sweep(&config), Err(SimError::InvalidRequest(_))));
    }
}
