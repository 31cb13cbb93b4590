//! Shared infrastructure for the qbench tools.
//!
//! - CLI styling and common arguments
//! - Error handling with actionable diagnostics
//! - Table rendering for terminal output
//! - Progress indicators

pub mod cli;
pub mod error;
pub mod output;
pub mod progress;

pub use cli::{styles, Cli, CommonArgs, OutputFormat, Verbosity};
pub use error::{QbenchError, Result};
pub use output::{format_bytes, format_seconds, Table, TableBuilder};
pub use progress::SweepProgress;
