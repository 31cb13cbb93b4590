//! Command-line arguments
//!
//! # Usage
//!
//! ```bash
//! qbench run ./out
//! qbench run ./out --min-qbits 2 --max-qbits 12 --n-circuits 5
//! qbench run ./out -c sweep.yaml --resume-strategy ordinal
//! qbench status ./out -c sweep.yaml
//! qbench report ./out
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qbench_common::CommonArgs;

use super::BenchConfig;
use crate::runner::ResumeStrategy;
use crate::simulator::SimulatorMethod;

/// qbench: resumable random-circuit benchmarks for quantum simulators
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "qbench")]
#[command(version)]
#[command(about = "Resumable random-circuit benchmarking harness for quantum simulators")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Logging level: critical, debug, error, info or warning (case insensitive)
    #[arg(long, global = true, env = "LOGGING_LEVEL", default_value = "info")]
    pub logging_level: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run (or resume) a sweep, then write the CSV and heatmap
    Run(RunArgs),

    /// Rebuild the CSV and heatmap from persisted results
    Report(ReportArgs),

    /// Show how much of a sweep is persisted
    Status(RunArgs),
}

/// Sweep arguments shared by `run` and `status`
///
/// Every setting is optional; unset values come from the config file, or
/// from the defaults when no file is given.
#[derive(Parser, Debug, Clone, PartialEq, Default)]
pub struct RunArgs {
    /// Output directory (results land in OUTPUT_DIR/data/results.json)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// YAML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Minimum number of qubits [default: 1]
    #[arg(long)]
    pub min_qbits: Option<u32>,

    /// Maximum number of qubits [default: 10]
    #[arg(long)]
    pub max_qbits: Option<u32>,

    /// Minimum circuit depth [default: 1]
    #[arg(long)]
    pub min_depth: Option<u32>,

    /// Maximum circuit depth [default: 10]
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Number of times a given circuit is run [default: 100]
    #[arg(long)]
    pub n_shots: Option<u32>,

    /// Number of circuits per (qubits, depth) pair [default: 10]
    #[arg(long)]
    pub n_circuits: Option<u32>,

    /// Simulator method [default: statevector]
    #[arg(short, long, value_enum)]
    pub method: Option<SimulatorMethod>,

    /// Device to use for simulation [default: CPU]
    #[arg(short, long)]
    pub device: Option<String>,

    /// Base seed for circuit generation [default: 0]
    #[arg(long)]
    pub seed: Option<u64>,

    /// How persisted results are matched against the sweep [default: keyed]
    #[arg(long, value_enum)]
    pub resume_strategy: Option<ResumeStrategy>,
}

/// Arguments for the report command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ReportArgs {
    /// Output directory of a previous run
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Rebuild results.csv even if it already exists
    #[arg(long)]
    pub rebuild: bool,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a configuration
pub fn apply_overrides(config: &mut BenchConfig, args: &RunArgs) {
    if let Some(min) = args.min_qbits {
        config.plan.qubits.min = min;
    }
    if let Some(max) = args.max_qbits {
        config.plan.qubits.max = max;
    }
    if let Some(min) = args.min_depth {
        config.plan.depth.min = min;
    }
    if let Some(max) = args.max_depth {
        config.plan.depth.max = max;
    }
    if let Some(n_shots) = args.n_shots {
        config.n_shots = n_shots;
    }
    if let Some(n_circuits) = args.n_circuits {
        config.plan.replicas = n_circuits;
    }
    if let Some(method) = args.method {
        config.method = method;
    }
    if let Some(device) = &args.device {
        config.device = device.clone();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(strategy) = args.resume_strategy {
        config.resume = strategy;
    }
}
