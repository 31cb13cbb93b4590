//! Common CLI arguments and terminal styling.

use clap::Args;
use std::fmt;
use std::str::FromStr;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected: table, json)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Verbosity of user-facing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Arguments shared by every qbench command line.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format (table, json)
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,
}

impl CommonArgs {
    /// Resolve the flags into a runtime configuration.
    pub fn to_cli(&self) -> Cli {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Cli { verbosity, format: self.format }
    }
}

/// Resolved CLI output configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cli {
    pub verbosity: Verbosity,
    pub format: OutputFormat,
}

impl Default for Cli {
    fn default() -> Self {
        Self { verbosity: Verbosity::Normal, format: OutputFormat::Table }
    }
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }
}

/// ANSI styling helpers for consistent terminal output.
pub mod styles {
    const RESET: &str = "\x1b[0m";
    const BOLD: &str = "\x1b[1m";
    const RED: &str = "\x1b[31m";
    const GREEN: &str = "\x1b[32m";
    const YELLOW: &str = "\x1b[33m";
    const CYAN: &str = "\x1b[36m";

    /// Section header.
    pub fn header(text: &str) -> String {
        format!("{BOLD}{CYAN}== {text} =={RESET}")
    }

    pub fn success(text: &str) -> String {
        format!("{GREEN}✓ {text}{RESET}")
    }

    pub fn info(text: &str) -> String {
        format!("{CYAN}ℹ {text}{RESET}")
    }

    pub fn warning(text: &str) -> String {
        format!("{YELLOW}⚠ {text}{RESET}")
    }

    pub fn error(text: &str) -> String {
        format!("{BOLD}{RED}✗ {text}{RESET}")
    }
}
