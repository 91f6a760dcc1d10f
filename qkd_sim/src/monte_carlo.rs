//! Monte Carlo averaging over independent runs.

use crate::error::{SimError, SimResult};
use qkd_core::{pipeline, SimulationParameters};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Descriptive statistics of one metric across trials.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialStats {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min_val: f64,
    pub max_val: f64,
}

impl TrialStats {
    /// Computes statistics over a non-empty sample.
    pub fn from_samples(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            mean,
            std: variance.sqrt(),
            min_val: values.iter().copied().fold(f64::INFINITY, f64::min),
            max_val: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Aggregated Monte Carlo output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloReport {
    pub trials: usize,
    pub qber: TrialStats,
    pub skr: TrialStats,
    pub sifted_key_length: TrialStats,
    pub final_key_length: TrialStats,
    /// Trials that ended SECURE
    pub secure_trials: usize,
}

/// Runs `trials` independent simulations; trial i uses seed `base + i`.
///
/// With no base seed in `params` every trial draws fresh OS entropy.
pub fn run_monte_carlo(params: &SimulationParameters, trials: usize) -> SimResult<MonteCarloReport> {
    if !(2..=100).contains(&trials) {
        return Err(SimError::invalid(format!(
            "trials must be between 2 and 100, got {}",
            trials
        )));
    }

    info!("Running {} Monte Carlo trials ({} photons each)", trials, params.photons);

    let mut qbers = Vec::with_capacity(trials);
    let mut skrs = Vec::with_capacity(trials);
    let mut sifted = Vec::with_capacity(trials);
    let mut finals = Vec::with_capacity(trials);
    let mut secure_trials = 0;

    for i in 0..trials {
        let mut trial = params.clone();
        trial.seed = params.seed.map(|seed| seed.wrapping_add(i as u64));

        let result = pipeline::run_seeded(&trial)?;
        qbers.push(result.qber);
        skrs.push(result.skr);
        sifted.push(result.sifted_key_length as f64);
        finals.push(result.final_key_length as f64);
        if result.security_status.is_secure() {
            secure_trials += 1;
        }
    }

    let stats = |values: &[f64]| {
        TrialStats::from_samples(values).ok_or_else(|| SimError::invalid("no trials ran"))
    };

    Ok(MonteCarloReport {
        trials,
        qber: stats(&qbers[..])?,
        skr: stats(&skrs[..])?,
        sifted_key_length: stats(&sifted[..])?,
        final_key_length: stats(&finals[..])?,
        secure_trials,
    })
}
