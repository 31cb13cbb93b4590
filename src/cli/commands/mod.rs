//! CLI command implementations

mod report;
mod run;
mod status;


use qbench_common::{OutputFormat, Result, Verbosity};

use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    let output = cli.common.to_cli();
    let level = output_level(output.verbosity, output.format);

    match cli.command {
        Command::Run(args) => run::run_bench(&args, level, output.format),
        Command::Report(args) => report::run_report(&args, level, output.format),
        Command::Status(args) => status::run_status(&args, level, output.format),
    }
}

/// Stdout carries only the JSON document in JSON mode.
fn output_level(verbosity: Verbosity, format: OutputFormat) -> LogLevel {
    match format {
        OutputFormat::Json => LogLevel::Quiet,
        OutputFormat::Table => LogLevel::from(verbosity),
    }
}
