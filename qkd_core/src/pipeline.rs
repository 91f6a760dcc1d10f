//! End-to-end BB84 run.
//!
//! ```text
//! Alice -> (Eve?) -> Channel -> Bob -> Sifting -> QBER -> Privacy amplification
//! ```
//!
//! Every stage draws from the one source handed to [`run`], in this order:
//! Alice bits, Alice bases, Eve (trials, bases, outcomes), channel
//! detection, Bob bases, Bob outcomes, Bob noise. Changing the order changes
//! what a given seed produces.

use crate::error::Result;
use crate::params::SimulationParameters;
use crate::types::{sample_bits, SecurityStatus};
use crate::{alice, bob, channel, eve, metrics, privacy, sifting};
use qkd_env::{source_for, RandomSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Number of leading bits kept in the display samples.
pub const SAMPLE_BITS: usize = 64;

/// Outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Quantum bit error rate of the sifted key
    pub qber: f64,

    /// Secret key rate, secure bits per emitted photon
    pub skr: f64,

    /// Photons Alice emitted
    pub total_photons: usize,

    /// Bits surviving basis reconciliation
    pub sifted_key_length: usize,

    /// Estimated secure key length after privacy amplification
    pub final_key_length: usize,

    /// Disagreeing positions in the sifted key
    pub mismatches: usize,

    /// Photons Eve intercepted (diagnostic)
    pub intercepted_count: usize,

    /// Leading bits of Alice's raw key
    pub raw_bits_sample: Vec<u8>,

    /// Leading bits of Bob's sifted key
    pub bob_bits_sample: Vec<u8>,

    /// Verdict against the configured QBER threshold
    pub security_status: SecurityStatus,
}

/// Runs one BB84 simulation drawing from `rng`.
///
/// An empty sifted key short-circuits to a COMPROMISED verdict with zero
/// metrics: no key means no security guarantee.
///
/// # Errors
/// `InvalidParameter` if `params` fails validation.
pub fn run<R: RandomSource + ?Sized>(
    params: &SimulationParameters,
    rng: &mut R,
) -> Result<SimulationResult> {
    params.validate()?;
    let n = params.photons;

    // Stage 1: Alice prepares
    let alice_bits = alice::generate_bits(n, rng);
    let alice_bases = alice::generate_bases(n, rng);

    // Stage 2: optional intercept-resend
    let eve_outcome =
        eve::intercept_resend(&alice_bits, &alice_bases, params.effective_eve_probability(), rng)?;

    // Stage 3: channel loss
    let detected = channel::simulate_detection(
        n,
        params.attenuation_db_per_km,
        params.distance_km,
        params.detector_efficiency,
        rng,
    )?;

    // Stage 4: Bob measures the post-Eve states
    let bob_bases = bob::generate_bases(n, rng);
    let bob_bits = bob::measure(
        &eve_outcome.effective_bits,
        &eve_outcome.effective_bases,
        &bob_bases,
        params.noise,
        rng,
    )?;

    // Stage 5: basis reconciliation
    let sift = sifting::sift(&alice_bits, &bob_bits, &alice_bases, &bob_bases, &detected)?;
    debug!("sifted {}/{} photons", sift.sifted_length, n);

    if sift.is_empty() {
        warn!("no sifted bits out of {} photons, no key can be extracted", n);
        return Ok(SimulationResult {
            qber: 0.0,
            skr: 0.0,
            total_photons: n,
            sifted_key_length: 0,
            final_key_length: 0,
            mismatches: 0,
            intercepted_count: eve_outcome.intercepted_count,
            raw_bits_sample: sample_bits(&alice_bits, SAMPLE_BITS),
            bob_bits_sample: Vec::new(),
            security_status: SecurityStatus::Compromised,
        });
    }

    // Stage 6: error estimation
    let (qber, mismatches) = metrics::qber(&sift.alice_sifted, &sift.bob_sifted)?;

    // Stage 7: key rate and verdict
    let sifted_fraction = sift.sifted_length as f64 / n as f64;
    let skr = privacy::secret_key_rate(sifted_fraction, qber, params.ec_efficiency)?;
    let final_key_length =
        privacy::estimate_final_key_length(sift.sifted_length, qber, params.ec_efficiency)?;
    let security_status = privacy::evaluate_security(qber, params.qber_threshold);

    debug!(
        "qber={:.6} mismatches={} skr={:.6} final_key={} status={}",
        qber, mismatches, skr, final_key_length, security_status
    );

    Ok(SimulationResult {
        qber,
        skr,
        total_photons: n,
        sifted_key_length: sift.sifted_length,
        final_key_length,
        mismatches,
        intercepted_count: eve_outcome.intercepted_count,
        raw_bits_sample: sample_bits(&alice_bits, SAMPLE_BITS),
        bob_bits_sample: sample_bits(&sift.bob_sifted, SAMPLE_BITS),
        security_status,
    })
}

/// Runs with a source built from `params.seed` (OS entropy when unset).
pub fn run_seeded(params: &SimulationParameters) -> Result<SimulationResult> {
    let mut rng = source_for(params.seed);
    run(params, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qkd_env::SeededSource;

    fn ideal(photons: usize, seed: u64) -> SimulationParameters {
        SimulationParameters::builder(photons)
            .attenuation(0.0)
            .distance_km(0.0)
            .noise(0.0)
            .detector_efficiency(1.0)
            .seed(Some(seed))
            .build()
            .unwrap()
    }

    #[test]
    fn test_ideal_link_is_secure_and_error_free() {
        let result = run_seeded(&ideal(100_000, 42)).unwrap();

        assert_eq!(result.total_photons, 100_000);
        assert_eq!(result.mismatches, 0);
        assert_eq!(result.qber, 0.0);
        assert_eq!(result.intercepted_count, 0);
        assert_eq!(result.security_status, SecurityStatus::Secure);
        // sigma ~= 158
        assert!(
            (result.sifted_key_length as i64 - 50_000).abs() < 800,
            "sifted = {}",
            result.sifted_key_length
        );
        assert_eq!(result.final_key_length, result.sifted_key_length);
    }

    #[test]
    fn test_full_intercept_is_compromised() {
        let mut params = ideal(100_000, 42);
        params.eve_enabled = true;
        params.eve_probability = 1.0;

        let result = run_seeded(&params).unwrap();

        assert_eq!(result.intercepted_count, 100_000);
        // ~50k sifted, sigma(qber) ~= 0.002
        assert!((result.qber - 0.25).abs() < 0.01, "qber = {}", result.qber);
        assert_eq!(result.security_status, SecurityStatus::Compromised);
        assert_eq!(result.skr, 0.0);
        assert_eq!(result.final_key_length, 0);
    }

    #[test]
    fn test_disabled_eve_ignores_probability() {
        let mut with_flag_off = ideal(5_000, 9);
        with_flag_off.eve_probability = 1.0;

        let a = run_seeded(&with_flag_off).unwrap();
        let b = run_seeded(&ideal(5_000, 9)).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.intercepted_count, 0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let params = SimulationParameters::builder(20_000)
            .distance_km(25.0)
            .noise(0.03)
            .detector_efficiency(0.7)
            .eve(0.2)
            .seed(Some(1234))
            .build()
            .unwrap();

        assert_eq!(run_seeded(&params).unwrap(), run_seeded(&params).unwrap());
    }

    #[test]
    fn test_different_seed_different_bits() {
        let a = run_seeded(&ideal(1_000, 1)).unwrap();
        let b = run_seeded(&ideal(1_000, 2)).unwrap();
        assert_ne!(a.raw_bits_sample, b.raw_bits_sample);
    }

    #[test]
    fn test_blackout_short_circuits() {
        let params = SimulationParameters::builder(1_000)
            .attenuation(10.0)
            .distance_km(1000.0)
            .seed(Some(5))
            .build()
            .unwrap();

        let result = run_seeded(&params).unwrap();

        assert_eq!(result.sifted_key_length, 0);
        assert_eq!(result.final_key_length, 0);
        assert_eq!(result.qber, 0.0);
        assert_eq!(result.skr, 0.0);
        assert_eq!(result.mismatches, 0);
        assert!(result.bob_bits_sample.is_empty());
        assert_eq!(result.raw_bits_sample.len(), SAMPLE_BITS);
        assert_eq!(result.security_status, SecurityStatus::Compromised);
    }

    #[test]
    fn test_noise_drives_qber() {
        let mut params = ideal(100_000, 77);
        params.noise = 0.05;

        let result = run_seeded(&params).unwrap();

        assert!((result.qber - 0.05).abs() < 0.005, "qber = {}", result.qber);
        assert_eq!(result.security_status, SecurityStatus::Secure);
        assert!(result.skr > 0.0);
        assert!(result.final_key_length < result.sifted_key_length);
    }

    #[test]
    fn test_rejects_invalid_params() {
        let params = SimulationParameters {
            photons: 10,
            ..Default::default()
        };
        let mut rng = SeededSource::new(1);
        assert!(run(&params, &mut rng).is_err());
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Draw {
        Bit,
        Unit,
    }

    /// Seeded source that logs every draw it serves.
    struct Recording {
        inner: SeededSource,
        draws: Vec<Draw>,
    }

    impl Recording {
        fn new(seed: u64) -> Self {
            Self {
                inner: SeededSource::new(seed),
                draws: Vec::new(),
            }
        }

        /// Collapses the log into (kind, consecutive count) runs.
        fn runs(&self) -> Vec<(Draw, usize)> {
            let mut runs: Vec<(Draw, usize)> = Vec::new();
            for draw in &self.draws {
                if let Some((kind, count)) = runs.last_mut() {
                    if *kind == *draw {
                        *count += 1;
                        continue;
                    }
                }
                runs.push((*draw, 1));
            }
            runs
        }
    }

    impl RandomSource for Recording {
        fn next_bit(&mut self) -> u8 {
            self.draws.push(Draw::Bit);
            self.inner.next_bit()
        }

        fn next_unit(&mut self) -> f64 {
            self.draws.push(Draw::Unit);
            self.inner.next_unit()
        }

        fn seed(&self) -> Option<u64> {
            self.inner.seed()
        }
    }

    #[test]
    fn test_draw_schedule_with_eve_and_noise() {
        let n = 300;
        let params = SimulationParameters::builder(n)
            .distance_km(10.0)
            .noise(0.02)
            .eve(1.0)
            .build()
            .unwrap();

        let mut rng = Recording::new(42);
        run(&params, &mut rng).unwrap();

        // Alice bits+bases, Eve trials, Eve bases+outcomes, channel,
        // Bob bases+outcomes, Bob noise
        assert_eq!(
            rng.runs(),
            vec![
                (Draw::Bit, 2 * n),
                (Draw::Unit, n),
                (Draw::Bit, 2 * n),
                (Draw::Unit, n),
                (Draw::Bit, 2 * n),
                (Draw::Unit, n),
            ]
        );
    }

    #[test]
    fn test_draw_schedule_without_eve_or_noise() {
        let n = 300;
        let params = SimulationParameters::builder(n).distance_km(10.0).build().unwrap();

        let mut rng = Recording::new(42);
        run(&params, &mut rng).unwrap();

        // Alice, channel, Bob; Eve and the noise mask draw nothing
        assert_eq!(
            rng.runs(),
            vec![(Draw::Bit, 2 * n), (Draw::Unit, n), (Draw::Bit, 2 * n)]
        );
    }

    #[test]
    fn test_run_matches_stage_by_stage_replay() {
        let params = SimulationParameters::builder(5_000)
            .distance_km(20.0)
            .detector_efficiency(0.7)
            .noise(0.03)
            .eve(0.3)
            .seed(Some(2024))
            .build()
            .unwrap();

        let result = run_seeded(&params).unwrap();

        // Same seed, stages called by hand in pipeline order
        let mut rng = SeededSource::new(2024);
        let n = params.photons;
        let alice_bits = alice::generate_bits(n, &mut rng);
        let alice_bases = alice::generate_bases(n, &mut rng);
        let eve_outcome = eve::intercept_resend(&alice_bits, &alice_bases, 0.3, &mut rng).unwrap();
        let detected = channel::simulate_detection(n, 0.2, 20.0, 0.7, &mut rng).unwrap();
        let bob_bases = bob::generate_bases(n, &mut rng);
        let bob_bits = bob::measure(
            &eve_outcome.effective_bits,
            &eve_outcome.effective_bases,
            &bob_bases,
            0.03,
            &mut rng,
        )
        .unwrap();
        let sift = sifting::sift(&alice_bits, &bob_bits, &alice_bases, &bob_bases, &detected).unwrap();
        let (qber, mismatches) = metrics::qber(&sift.alice_sifted, &sift.bob_sifted).unwrap();

        assert_eq!(result.intercepted_count, eve_outcome.intercepted_count);
        assert_eq!(result.sifted_key_length, sift.sifted_length);
        assert_eq!(result.mismatches, mismatches);
        assert_eq!(result.qber, qber);
        assert_eq!(result.raw_bits_sample, alice_bits[..SAMPLE_BITS].to_vec());
        assert_eq!(result.bob_bits_sample, sift.bob_sifted[..SAMPLE_BITS].to_vec());
    }

    #[test]
    fn test_samples_are_bounded() {
        let result = run_seeded(&ideal(1_000, 3)).unwrap();
        assert_eq!(result.raw_bits_sample.len(), SAMPLE_BITS);
        assert_eq!(result.bob_bits_sample.len(), SAMPLE_BITS);
    }
}
