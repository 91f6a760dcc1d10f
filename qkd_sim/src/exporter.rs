//! JSON exporter for runs, sweeps and Monte Carlo reports.
//!
//! Exports are plain JSON documents consumed by plotting scripts and CI.
//! Floating metrics are rounded to 6 decimals on the way out; the in-memory
//! results keep full precision.

use crate::monte_carlo::MonteCarloReport;
use crate::sweep::{ParamSweepReport, SweepPoint, SweepReport};
use qkd_core::SimulationResult;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Rounds to 6 decimal places for display.
pub fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Copy of a run result with display-rounded QBER/SKR.
pub fn rounded_result(result: &SimulationResult) -> SimulationResult {
    SimulationResult {
        qber: round6(result.qber),
        skr: round6(result.skr),
        ..result.clone()
    }
}

fn rounded_points(points: &[SweepPoint]) -> Vec<SweepPoint> {
    points
        .iter()
        .map(|p| SweepPoint {
            x: round6(p.x),
            qber: round6(p.qber),
            skr: round6(p.skr),
            ..p.clone()
        })
        .collect()
}

/// Payload of an export file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ExportPayload {
    Run(SimulationResult),
    Sweep(SweepReport),
    ParamSweep(ParamSweepReport),
    MonteCarlo(MonteCarloReport),
}

impl ExportPayload {
    /// Returns the payload with display rounding applied.
    pub fn rounded(self) -> Self {
        match self {
            ExportPayload::Run(result) => ExportPayload::Run(rounded_result(&result)),
            ExportPayload::Sweep(report) => ExportPayload::Sweep(SweepReport {
                distance_sweep: rounded_points(&report.distance_sweep),
                noise_sweep: rounded_points(&report.noise_sweep),
            }),
            ExportPayload::ParamSweep(report) => ExportPayload::ParamSweep(ParamSweepReport {
                sweep_param: report.sweep_param,
                points: rounded_points(&report.points),
            }),
            other => other,
        }
    }
}

/// Complete export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Seed used (absent for unseeded runs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Simulator version that produced the file
    pub version: String,

    #[serde(flatten)]
    pub payload: ExportPayload,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(seed: Option<u64>, payload: ExportPayload) -> Self {
        Self {
            seed,
            version: env!("CARGO_PKG_VERSION").to_string(),
            payload: payload.rounded(),
        }
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
