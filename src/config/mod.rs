//! Configuration: YAML benchmark settings and command-line arguments.

mod args;
mod bench;


pub use args::{apply_overrides, parse_args, Cli, Command, ReportArgs, RunArgs};
pub use bench::{BenchConfig, DEFAULT_DEVICE, DEFAULT_SHOTS};

use qbench_common::Result;

/// Resolve the effective configuration of a `run` or `status` invocation.
///
/// Loads the config file when one is given, applies the command-line
/// overrides and validates the result.
pub fn resolve(args: &RunArgs) -> Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_yaml_file(path)?,
        None => BenchConfig::default(),
    };
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}
