//! QKD-Lab Simulation Harness
//!
//! Orchestration on top of `qkd_core`: every entry point here only builds
//! parameter sets, invokes the core, and aggregates what comes back.
//!
//! - **Scenarios**: named link/attack setups with analytic pass/fail checks
//! - **Sweeps**: QBER and key rate against distance, noise, or any one knob
//! - **Monte Carlo**: mean/std/min/max over independent seeded trials
//! - **Export**: JSON documents for plotting and CI
//!
//! # Reproducibility
//!
//! Runs never share state. Each one owns a random source derived from its
//! own seed, so a failing configuration replays from the seed alone.
//!
//! # Usage
//!
//! ```
//! use qkd_sim::{linspace, ScenarioId, ScenarioRunner, SweepParam};
//!
//! let result = ScenarioRunner::new(42).run(ScenarioId::FullIntercept);
//! assert!(result.passed);
//!
//! assert_eq!("noise".parse::<SweepParam>(), Ok(SweepParam::Noise));
//! assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
//! ```

mod error;
mod exporter;
mod monte_carlo;
mod runner;
mod scenarios;
mod sweep;

pub use error::{SimError, SimResult};
pub use exporter::{round6, rounded_result, ExportPayload, SimExport};
pub use monte_carlo::{run_monte_carlo, MonteCarloReport, TrialStats};
pub use runner::{ScenarioResult, ScenarioRunner};
pub use scenarios::ScenarioId;
pub use sweep::{
    linspace, run_param_sweep, run_sweep, ParamSweepConfig, ParamSweepReport, SweepConfig,
    SweepParam, SweepPoint, SweepReport,
};
