//! pathweave-bench: CLI tool for route-map parameter experimentation.
//!
//! Generates a route map with configurable parameters, printing per-stage
//! diagnostics. Useful for:
//!
//! - Tuning the Poisson-disk radius against the size of the map
//! - Seeing how the penalty spreads successive routes
//! - Measuring per-stage durations to identify bottlenecks
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin pathweave-bench -- [OPTIONS]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use pathweave_core::diagnostics::{Clock, GenerationDiagnostics, StageMetrics};
use pathweave_core::{GenerationConfig, Point};

/// Route-map parameter experimentation and diagnostics for pathweave.
///
/// Samples points, triangulates them, and accepts a number of routes
/// between the two anchors, printing per-stage timing and counts.
#[derive(Parser)]
#[command(name = "pathweave-bench", version)]
struct Cli {
    /// Start anchor X coordinate.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_START.x, allow_hyphen_values = true)]
    start_x: f64,

    /// Start anchor Y coordinate.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_START.y, allow_hyphen_values = true)]
    start_y: f64,

    /// End anchor X coordinate.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_END.x, allow_hyphen_values = true)]
    end_x: f64,

    /// End anchor Y coordinate.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_END.y, allow_hyphen_values = true)]
    end_y: f64,

    /// Minimum separation between sampled points.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_MIN_RADIUS)]
    min_radius: f64,

    /// Sampling candidates per active point.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_SAMPLE_ATTEMPTS, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    sample_attempts: u32,

    /// Cost added to one edge of each accepted route.
    #[arg(long, default_value_t = GenerationConfig::DEFAULT_PENALTY, value_parser = clap::builder::RangedU64ValueParser::<u64>::new().range(1..))]
    penalty: u64,

    /// Seed for the random source. Without it every run differs.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of routes to accept per run.
    #[arg(long, default_value_t = 6)]
    routes: usize,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full generation config as a JSON string.
    ///
    /// When provided, all other generation parameter flags are ignored.
    /// The JSON must be a valid `GenerationConfig` serialization; missing
    /// fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Write the session state (points, triangles, edges, routes) as JSON.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

/// Build a [`GenerationConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<GenerationConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(GenerationConfig {
        start: Point::new(cli.start_x, cli.start_y),
        end: Point::new(cli.end_x, cli.end_y),
        min_radius: cli.min_radius,
        sample_attempts: cli.sample_attempts,
        penalty: cli.penalty,
        seed: cli.seed,
        ..GenerationConfig::default()
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Config: {config:#?}");
    eprintln!("Routes: {}", cli.routes);
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match pathweave_core::generate_with_diagnostics(config.clone(), cli.routes, &StdClock) {
            Ok((session, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write the snapshot on the first run only.
                if run == 0
                    && let Some(ref snapshot_path) = cli.snapshot
                {
                    match serde_json::to_string(&session.snapshot()) {
                        Ok(json) => match std::fs::write(snapshot_path, &json) {
                            Ok(()) => {
                                eprintln!(
                                    "Snapshot written to {} ({} bytes)",
                                    snapshot_path.display(),
                                    json.len(),
                                );
                            }
                            Err(e) => {
                                eprintln!(
                                    "Error writing snapshot to {}: {e}",
                                    snapshot_path.display()
                                );
                            }
                        },
                        Err(e) => eprintln!("Error serializing snapshot: {e}"),
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                log::error!("generation failed: {e}");
                eprintln!("Generation error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&GenerationDiagnostics) -> Duration;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[GenerationDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    let distinct: Vec<f64> = all_diagnostics
        .iter()
        .filter_map(|d| match d.routing.metrics {
            StageMetrics::Routing { distinct, .. } => Some(distinct as f64),
            _ => None,
        })
        .collect();
    if !distinct.is_empty() {
        let mean_distinct = distinct.iter().sum::<f64>() / distinct.len() as f64;
        println!("Distinct routes: mean={mean_distinct:.2}");
    }

    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Sampling", |d| d.sampling.duration),
        ("Triangulation", |d| d.triangulation.duration),
        ("Graph", |d| d.graph.duration),
        ("Routing", |d| d.routing.duration),
    ];

    for (name, extractor) in stage_extractors {
        let stage_mean = all_diagnostics
            .iter()
            .map(|d| extractor(d).as_secs_f64() * 1000.0)
            .sum::<f64>()
            / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
