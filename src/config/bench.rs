//! Benchmark configuration
//!
//! A `BenchConfig` fully describes a sweep: its ranges, the simulator settings
//! applied to every unit and the resume strategy. It can be loaded from YAML;
//! every field is optional and defaults to the command-line defaults.

use std::fs;
use std::path::Path;

use qbench_common::{QbenchError, Result};
use serde::{Deserialize, Serialize};

use crate::runner::ResumeStrategy;
use crate::simulator::{is_supported_device, SimulatorMethod, MAX_QUBITS};
use crate::sweep::SweepPlan;

/// Default number of shots per circuit
pub const DEFAULT_SHOTS: u32 = 100;

/// Default simulation device
pub const DEFAULT_DEVICE: &str = "CPU";

/// Complete description of a benchmark run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Qubit range, depth range and circuits per cell
    pub plan: SweepPlan,
    /// Shots per circuit
    pub n_shots: u32,
    /// Simulation method
    pub method: SimulatorMethod,
    /// Simulation device
    pub device: String,
    /// Base seed for circuit generation
    pub seed: u64,
    /// How persisted results are matched on resume
    pub resume: ResumeStrategy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            plan: SweepPlan::default(),
            n_shots: DEFAULT_SHOTS,
            method: SimulatorMethod::default(),
            device: DEFAULT_DEVICE.to_string(),
            seed: 0,
            resume: ResumeStrategy::default(),
        }
    }
}

impl BenchConfig {
    /// Load a configuration file. The result is not validated.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(QbenchError::ConfigNotFound { path: path.to_path_buf() });
        }
        let yaml = fs::read_to_string(path)
            .map_err(|e| QbenchError::io(format!("reading {}", path.display()), e))?;
        Self::from_yaml_str(&yaml).map_err(|e| match e {
            QbenchError::Serialization { message } => {
                QbenchError::ConfigParsing { path: path.to_path_buf(), message }
            }
            other => other,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| QbenchError::Serialization { message: e.to_string() })
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| QbenchError::Serialization { message: e.to_string() })
    }

    /// Check everything that can be rejected before any unit runs.
    pub fn validate(&self) -> Result<()> {
        self.plan.validate()?;

        if self.n_shots == 0 {
            return Err(QbenchError::invalid_config(
                "n_shots",
                "shot count must be positive",
                "Use --n-shots 1 or higher",
            ));
        }
        if !self.method.is_supported() {
            return Err(QbenchError::invalid_config(
                "method",
                format!("'{}' is not supported by the built-in engine", self.method),
                "Use --method statevector or --method automatic",
            ));
        }
        if !is_supported_device(&self.device) {
            return Err(QbenchError::invalid_config(
                "device",
                format!("'{}' is not supported by the built-in engine", self.device),
                "Use --device CPU",
            ));
        }
        if self.plan.qubits.max as usize > MAX_QUBITS {
            return Err(QbenchError::invalid_config(
                "qubits",
                format!("{} qubits exceed the dense state limit of {MAX_QUBITS}", self.plan.qubits.max),
                format!("Use --max-qbits {MAX_QUBITS} or lower"),
            ));
        }
        Ok(())
    }
}
