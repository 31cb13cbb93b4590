//! qbench CLI
//!
//! # Usage
//!
//! ```bash
//! # Sweep 1..=10 qubits and depths with 10 circuits each
//! qbench run out/
//!
//! # Smaller sweep, resumed automatically if out/ already holds results
//! qbench run out/ --max-qbits 4 --max-depth 5 --n-circuits 3
//!
//! # Settings from a file, overrides on top
//! qbench run out/ -c sweep.yaml --n-shots 1000
//!
//! # How far along is a sweep
//! qbench status out/ -c sweep.yaml
//!
//! # Regenerate results.csv and heatmap.svg
//! qbench report out/ --rebuild
//! ```

use clap::Parser;
use qbench::cli::{init_tracing, run_command, Cli, LoggingLevel};
use qbench_common::styles;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(LoggingLevel::from_name(&cli.logging_level));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = e.code(), "command failed");
            eprintln!("{}", styles::error(&format!("[{}] {e}", e.code())));
            ExitCode::FAILURE
        }
    }
}
