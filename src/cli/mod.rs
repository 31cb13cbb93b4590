//! CLI module for qbench
//!
//! Command handlers and output utilities.

mod commands;
pub mod logging;

pub use commands::run_command;
pub use logging::{init_tracing, LogLevel, LoggingLevel};

// Re-export Cli from config for convenience
pub use crate::config::Cli;
