//! Scenario runner - executes named scenarios and checks their outcomes.

use crate::scenarios::ScenarioId;

use qkd_core::channel::detection_probability;
use qkd_core::{pipeline, SecurityStatus, SimulationParameters, SimulationResult};
use qkd_env::SeededSource;
use tracing::{debug, info, warn};

/// Tolerance, in standard deviations, for statistical assertions.
const SIGMA_TOLERANCE: f64 = 5.0;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Simulation output (absent if the core rejected the parameters)
    pub result: Option<SimulationResult>,
}

/// Analytic expectations for a parameter set.
#[derive(Debug, Clone, Copy)]
struct Expectation {
    /// Per-photon probability of surviving sifting
    sift_probability: f64,

    /// Per-sifted-bit error probability
    qber: f64,
}

impl Expectation {
    fn for_params(params: &SimulationParameters) -> Self {
        let p_detect = detection_probability(
            params.attenuation_db_per_km,
            params.distance_km,
            params.detector_efficiency,
        );
        let eve_error = params.effective_eve_probability() / 4.0;
        let noise = params.noise;

        Self {
            sift_probability: p_detect / 2.0,
            // Eve's error and the noise flip cancel when both occur
            qber: eve_error * (1.0 - noise) + (1.0 - eve_error) * noise,
        }
    }
}

/// Runs scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Photons emitted per run
    photons: usize,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            photons: 100_000,
        }
    }

    /// Sets the photon count.
    pub fn with_photons(mut self, photons: usize) -> Self {
        self.photons = photons;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        let params = scenario.parameters(self.photons, self.seed);

        let mut rng = SeededSource::new(self.seed);
        let result = match pipeline::run(&params, &mut rng) {
            Ok(result) => result,
            Err(e) => {
                warn!("Scenario {} rejected by core: {}", scenario.name(), e);
                return ScenarioResult {
                    scenario,
                    seed: self.seed,
                    passed: false,
                    failure_reason: Some(e.to_string()),
                    result: None,
                };
            }
        };

        debug!(
            "  sifted={} qber={:.4} skr={:.6} status={}",
            result.sifted_key_length, result.qber, result.skr, result.security_status
        );

        let failure_reason = self
            .check_statistics(&params, &result)
            .err()
            .or_else(|| Self::check_verdict(scenario, &result).err());

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            failure_reason,
            result: Some(result),
        }
    }

    /// Checks sifted length and QBER against their analytic expectations.
    fn check_statistics(
        &self,
        params: &SimulationParameters,
        result: &SimulationResult,
    ) -> Result<(), String> {
        let expected = Expectation::for_params(params);
        let n = params.photons as f64;

        let mean_sifted = n * expected.sift_probability;
        let sigma_sifted =
            (n * expected.sift_probability * (1.0 - expected.sift_probability)).sqrt();
        let sifted = result.sifted_key_length as f64;
        if (sifted - mean_sifted).abs() > SIGMA_TOLERANCE * sigma_sifted + 1.0 {
            return Err(format!(
                "sifted length {} outside {:.1} +/- {:.1}",
                result.sifted_key_length,
                mean_sifted,
                SIGMA_TOLERANCE * sigma_sifted
            ));
        }

        if result.sifted_key_length > 0 {
            let m = sifted;
            let sigma_qber = (expected.qber * (1.0 - expected.qber) / m).sqrt();
            if (result.qber - expected.qber).abs() > SIGMA_TOLERANCE * sigma_qber + 1e-9 {
                return Err(format!(
                    "QBER {:.4} outside {:.4} +/- {:.4}",
                    result.qber,
                    expected.qber,
                    SIGMA_TOLERANCE * sigma_qber
                ));
            }
        }

        Ok(())
    }

    /// Checks the scenario-specific verdict.
    fn check_verdict(scenario: ScenarioId, result: &SimulationResult) -> Result<(), String> {
        let expect_status = |status: SecurityStatus| {
            if result.security_status == status {
                Ok(())
            } else {
                Err(format!(
                    "expected {}, got {} (qber={:.4})",
                    status, result.security_status, result.qber
                ))
            }
        };

        match scenario {
            ScenarioId::IdealLink => {
                if result.mismatches != 0 {
                    return Err(format!("{} mismatches on an ideal link", result.mismatches));
                }
                expect_status(SecurityStatus::Secure)
            }
            ScenarioId::FullIntercept => {
                if result.skr != 0.0 {
                    return Err(format!("key rate {:.6} under full intercept", result.skr));
                }
                expect_status(SecurityStatus::Compromised)
            }
            ScenarioId::PartialIntercept | ScenarioId::LongHaul | ScenarioId::LossyDetector => {
                expect_status(SecurityStatus::Secure)
            }
            ScenarioId::NoisyLink => {
                if result.skr <= 0.0 {
                    return Err("no key rate on a 3% noise link".to_string());
                }
                expect_status(SecurityStatus::Secure)
            }
            ScenarioId::NoiseSaturation => {
                if result.skr != 0.0 || result.final_key_length != 0 {
                    return Err(format!("key survived saturation (skr={:.6})", result.skr));
                }
                expect_status(SecurityStatus::Compromised)
            }
            ScenarioId::Blackout => {
                if result.sifted_key_length != 0 {
                    return Err(format!("{} bits sifted through a blackout", result.sifted_key_length));
                }
                expect_status(SecurityStatus::Compromised)
            }
        }
    }
}
