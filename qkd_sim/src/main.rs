//! QKD-Lab BB84 Simulator CLI
//!
//! Run single simulations, sweeps, Monte Carlo batches and named scenarios.

use clap::{Args, Parser, Subcommand};
use qkd_core::{pipeline, SimulationParameters};
use qkd_sim::{
    run_monte_carlo, run_param_sweep, run_sweep, ExportPayload, ParamSweepConfig, ScenarioId,
    ScenarioResult, ScenarioRunner, SimError, SimExport, SimResult, SweepConfig, SweepParam,
};
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// QKD-Lab BB84 deployment and attack simulator
#[derive(Parser, Debug)]
#[command(name = "qkd-sim")]
#[command(about = "Simulate BB84 quantum key distribution links", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON output on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Write the result to a JSON file
    #[arg(long, global = true)]
    export: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a single simulation
    Run(LinkArgs),

    /// Sweep distance then noise
    Sweep {
        #[command(flatten)]
        link: LinkArgs,

        #[arg(long, default_value = "0")]
        distance_min: f64,
        #[arg(long, default_value = "100")]
        distance_max: f64,
        #[arg(long, default_value = "20")]
        distance_steps: usize,

        #[arg(long, default_value = "0")]
        noise_min: f64,
        #[arg(long, default_value = "0.15")]
        noise_max: f64,
        #[arg(long, default_value = "20")]
        noise_steps: usize,
    },

    /// Sweep a single parameter (distance, noise, attenuation, detector_efficiency, eve_probability)
    ParamSweep {
        #[command(flatten)]
        link: LinkArgs,

        #[arg(long)]
        param: SweepParam,
        #[arg(long)]
        min: f64,
        #[arg(long)]
        max: f64,
        #[arg(long, default_value = "25")]
        steps: usize,
    },

    /// Aggregate statistics over independent trials
    MonteCarlo {
        #[command(flatten)]
        link: LinkArgs,

        /// Number of trials (2-100)
        #[arg(long, default_value = "10")]
        trials: usize,
    },

    /// Run named scenarios with pass/fail checks
    Scenario {
        /// Scenario to run (ideal_link, full_intercept, ..., all)
        #[arg(short = 'S', long, default_value = "all")]
        scenario: String,

        /// Master seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Number of consecutive seeds to test (for CI mode)
        #[arg(long, default_value = "1")]
        seeds: usize,

        /// Photons per run
        #[arg(short, long, default_value = "100000")]
        photons: usize,
    },
}

/// Link parameters. Flags override values loaded from `--params`.
#[derive(Args, Debug)]
struct LinkArgs {
    /// JSON file with a parameter set
    #[arg(long)]
    params: Option<String>,

    #[arg(short, long)]
    photons: Option<usize>,
    /// Fiber length (km)
    #[arg(short, long)]
    distance: Option<f64>,
    /// Attenuation (dB/km)
    #[arg(short, long)]
    attenuation: Option<f64>,
    /// Bit-flip probability
    #[arg(short, long)]
    noise: Option<f64>,
    /// Detector efficiency
    #[arg(short = 'e', long)]
    detector_efficiency: Option<f64>,
    /// Enable Eve with this interception probability
    #[arg(long)]
    eve: Option<f64>,
    #[arg(long)]
    qber_threshold: Option<f64>,
    /// Error-correction inefficiency f_EC
    #[arg(long)]
    ec_efficiency: Option<f64>,
    #[arg(short, long)]
    seed: Option<u64>,
}

impl LinkArgs {
    fn resolve(&self, defaults: SimulationParameters) -> SimResult<SimulationParameters> {
        let mut params = match &self.params {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str(&text)?
            }
            None => defaults,
        };

        if let Some(v) = self.photons {
            params.photons = v;
        }
        if let Some(v) = self.distance {
            params.distance_km = v;
        }
        if let Some(v) = self.attenuation {
            params.attenuation_db_per_km = v;
        }
        if let Some(v) = self.noise {
            params.noise = v;
        }
        if let Some(v) = self.detector_efficiency {
            params.detector_efficiency = v;
        }
        if let Some(v) = self.eve {
            params.eve_enabled = true;
            params.eve_probability = v;
        }
        if let Some(v) = self.qber_threshold {
            params.qber_threshold = v;
        }
        if let Some(v) = self.ec_efficiency {
            params.ec_efficiency = v;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }

        params.validate()?;
        Ok(params)
    }
}

fn emit(cli: &Cli, seed: Option<u64>, payload: ExportPayload) -> SimResult<()> {
    let export = SimExport::new(seed, payload);

    if cli.json {
        println!("{}", export.to_json()?);
    }
    if let Some(path) = &cli.export {
        export.write_to_file(path)?;
        info!("Exported to {}", path);
    }
    Ok(())
}

fn run_scenarios(
    cli: &Cli,
    scenario: &str,
    base_seed: u64,
    seeds: usize,
    photons: usize,
) -> SimResult<bool> {
    let scenarios: Vec<ScenarioId> = if scenario == "all" {
        ScenarioId::all()
    } else {
        vec![scenario.parse::<ScenarioId>().map_err(SimError::InvalidRequest)?]
    };

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for seed_offset in 0..seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(seed).with_photons(photons);

        for scenario in &scenarios {
            let result = runner.run(*scenario);
            if !cli.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
            all_results.push(result);
        }
    }

    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();

    if cli.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "failure_reason": r.failure_reason,
                    "result": r.result.as_ref().map(qkd_sim::rounded_result),
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if failed_count == 0 {
        info!("✅ All {} scenario runs passed!", total);
    } else {
        error!("❌ {}/{} scenario runs failed!", failed_count, total);
    }

    Ok(failed_count == 0)
}

fn execute(cli: &Cli) -> SimResult<bool> {
    match &cli.command {
        Command::Run(link) => {
            let params = link.resolve(SimulationParameters::default())?;
            let result = pipeline::run_seeded(&params)?;

            if !cli.json {
                info!("Photons emitted:   {}", result.total_photons);
                info!("Eve intercepted:   {}", result.intercepted_count);
                info!("Sifted key:        {}", result.sifted_key_length);
                info!("Mismatches:        {}", result.mismatches);
                info!("QBER:              {:.6}", result.qber);
                info!("Secret key rate:   {:.6} bits/photon", result.skr);
                info!("Final key length:  {}", result.final_key_length);
                info!("Status:            {}", result.security_status);
            }
            emit(cli, params.seed, ExportPayload::Run(result))?;
        }
        Command::Sweep {
            link,
            distance_min,
            distance_max,
            distance_steps,
            noise_min,
            noise_max,
            noise_steps,
        } => {
            let config = SweepConfig {
                base: link.resolve(SweepConfig::default().base)?,
                distance_min: *distance_min,
                distance_max: *distance_max,
                distance_steps: *distance_steps,
                noise_min: *noise_min,
                noise_max: *noise_max,
                noise_steps: *noise_steps,
            };
            let report = run_sweep(&config)?;

            if !cli.json {
                for p in &report.distance_sweep {
                    info!("L={:>7.2} km  qber={:.4}  skr={:.6}", p.x, p.qber, p.skr);
                }
                for p in &report.noise_sweep {
                    info!("noise={:.4}  qber={:.4}  skr={:.6}", p.x, p.qber, p.skr);
                }
            }
            emit(cli, config.base.seed, ExportPayload::Sweep(report))?;
        }
        Command::ParamSweep {
            link,
            param,
            min,
            max,
            steps,
        } => {
            let config = ParamSweepConfig {
                base: link.resolve(SweepConfig::default().base)?,
                param: *param,
                min: *min,
                max: *max,
                steps: *steps,
            };
            let report = run_param_sweep(&config)?;

            if !cli.json {
                for p in &report.points {
                    info!("{}={:.6}  qber={:.4}  skr={:.6}", param, p.x, p.qber, p.skr);
                }
            }
            emit(cli, config.base.seed, ExportPayload::ParamSweep(report))?;
        }
        Command::MonteCarlo { link, trials } => {
            let params = link.resolve(SweepConfig::default().base)?;
            let report = run_monte_carlo(&params, *trials)?;

            if !cli.json {
                info!(
                    "QBER  mean={:.6} std={:.6} min={:.6} max={:.6}",
                    report.qber.mean, report.qber.std, report.qber.min_val, report.qber.max_val
                );
                info!(
                    "SKR   mean={:.6} std={:.6} min={:.6} max={:.6}",
                    report.skr.mean, report.skr.std, report.skr.min_val, report.skr.max_val
                );
                info!("Secure trials: {}/{}", report.secure_trials, report.trials);
            }
            emit(cli, params.seed, ExportPayload::MonteCarlo(report))?;
        }
        Command::Scenario {
            scenario,
            seed,
            seeds,
            photons,
        } => {
            return run_scenarios(cli, scenario, *seed, *seeds, *photons);
        }
    }

    Ok(true)
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder().with_max_level(level);
    let installed = match EnvFilter::try_from_default_env() {
        Ok(filter) => tracing::subscriber::set_global_default(builder.with_env_filter(filter).finish()),
        Err(_) => tracing::subscriber::set_global_default(builder.finish()),
    };
    if let Err(e) = installed {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !cli.json {
        info!("QKD-Lab BB84 Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    match execute(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
