//! Error types with actionable diagnostics.
//!
//! Every variant carries enough context to tell the user what went wrong and
//! what to do next without reading the source.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for qbench operations.
pub type Result<T> = std::result::Result<T, QbenchError>;

/// Errors surfaced by the qbench tools.
#[derive(Error, Debug)]
pub enum QbenchError {
    /// A sweep or simulator setting is out of range.
    #[error("Invalid configuration value for '{field}': {message}\n  → {suggestion}")]
    InvalidConfiguration { field: String, message: String, suggestion: String },

    /// Configuration file not found at expected path.
    #[error("Configuration file not found: {path}\n  → Create a config file or drop --config to use the defaults")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file has invalid syntax.
    #[error("Invalid configuration syntax in {path}:\n  {message}\n  → Check the YAML syntax at the indicated line")]
    ConfigParsing { path: PathBuf, message: String },

    /// The durable result store could not be read or written.
    #[error("Result store error at {location}: {message}\n  → Previously checkpointed results are left untouched; fix the store and re-run to resume")]
    Storage { location: String, message: String },

    /// A single sweep unit failed and aborted the run.
    #[error("Work unit {parameter} failed: {message}\n  → Completed units are checkpointed; re-run after fixing the cause to resume")]
    WorkFailure { parameter: String, message: String },

    /// Post-processing (CSV or plot) failed.
    #[error("Report generation failed: {message}")]
    Report { message: String },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic error for unexpected conditions.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl QbenchError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// Create a configuration error for `field`.
    pub fn invalid_config(
        field: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Check if this error is user-recoverable.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. } | Self::ConfigNotFound { .. } | Self::ConfigParsing { .. }
        )
    }

    /// Get the error code for structured output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => "E001",
            Self::ConfigNotFound { .. } => "E002",
            Self::ConfigParsing { .. } => "E003",
            Self::Storage { .. } => "E010",
            Self::WorkFailure { .. } => "E020",
            Self::Report { .. } => "E030",
            Self::Io { .. } => "E050",
            Self::Serialization { .. } => "E051",
            Self::Internal { .. } => "E999",
        }
    }
}
