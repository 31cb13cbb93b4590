//! Built-in simulator backend
//!
//! Random circuit generation, basis transpilation and a dense state-vector
//! engine. Together they form the default work function of the `run`
//! command: each sweep unit builds a reproducible random circuit, times its
//! simulation and returns a [`ResultRecord`](crate::record::ResultRecord).

mod backend;
mod circuit;
mod statevector;

pub use backend::{circuit_seed, StatevectorBackend, BACKEND_NAME};
pub use circuit::{random_circuit, transpile, Circuit, Gate, Instruction, CONDITIONAL_PROBABILITY};
pub use statevector::{simulate, Counts, StateVector};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest register the dense engine accepts (2^26 amplitudes, 1 GiB).
pub const MAX_QUBITS: usize = 26;

/// Simulation methods known by name.
///
/// Only [`Automatic`](Self::Automatic) and [`Statevector`](Self::Statevector)
/// are executable by the built-in engine; the others are rejected before a
/// sweep starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SimulatorMethod {
    Automatic,
    #[default]
    Statevector,
    DensityMatrix,
    Stabilizer,
    MatrixProductState,
    ExtendedStabilizer,
    Unitary,
    Superop,
    TensorNetwork,
}

impl SimulatorMethod {
    pub const ALL: [SimulatorMethod; 9] = [
        Self::Automatic,
        Self::Statevector,
        Self::DensityMatrix,
        Self::Stabilizer,
        Self::MatrixProductState,
        Self::ExtendedStabilizer,
        Self::Unitary,
        Self::Superop,
        Self::TensorNetwork,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Statevector => "statevector",
            Self::DensityMatrix => "density_matrix",
            Self::Stabilizer => "stabilizer",
            Self::MatrixProductState => "matrix_product_state",
            Self::ExtendedStabilizer => "extended_stabilizer",
            Self::Unitary => "unitary",
            Self::Superop => "superop",
            Self::TensorNetwork => "tensor_network",
        }
    }

    /// Whether the built-in engine can execute this method.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Automatic | Self::Statevector)
    }
}

impl fmt::Display for SimulatorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the built-in engine can run on `device`.
pub fn is_supported_device(device: &str) -> bool {
    device.eq_ignore_ascii_case("cpu")
}

/// Errors from the simulator backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("simulation method '{0}' is not supported by the built-in engine (use automatic or statevector)")]
    UnsupportedMethod(SimulatorMethod),

    #[error("device '{0}' is not supported by the built-in engine (use CPU)")]
    UnsupportedDevice(String),

    #[error("{n_qbits} qubits exceed the dense state limit of {max}")]
    TooManyQubits { n_qbits: usize, max: usize },

    #[error("gate '{gate}' on {qubits:?} is invalid for a {n_qbits}-qubit register")]
    InvalidOperands { gate: &'static str, qubits: Vec<usize>, n_qbits: usize },

    #[error("gate '{0}' is not in the engine basis; transpile the circuit first")]
    NotInBasis(&'static str),
}

impl From<SimulationError> for qbench_common::QbenchError {
    fn from(err: SimulationError) -> Self {
        let field = match &err {
            SimulationError::UnsupportedMethod(_) => "method",
            SimulationError::UnsupportedDevice(_) => "device",
            SimulationError::TooManyQubits { .. } => "qubits",
            SimulationError::InvalidOperands { .. } | SimulationError::NotInBasis(_) => {
                return Self::Internal { message: err.to_string() };
            }
        };
        Self::invalid_config(field, err.to_string(), "See `qbench run --help` for supported values")
    }
}
