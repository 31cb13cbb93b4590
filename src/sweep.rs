//! Sweep enumeration.
//!
//! A sweep is the Cartesian product of an inclusive qubit-count range, an
//! inclusive depth range and a replica count. The enumeration order is
//! qubit-major, then depth, then replica, and is the same on every run with
//! the same inputs.

use std::fmt;
use std::ops::RangeInclusive;

use qbench_common::{QbenchError, Result};
use serde::{Deserialize, Serialize};

/// One unit of work: a circuit shape plus the replica index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SweepParameter {
    /// Number of qubits
    pub n_qbits: u32,
    /// Circuit depth
    pub depth: u32,
    /// Replica index, starting at 1
    pub replica: u32,
}

impl SweepParameter {
    pub fn new(n_qbits: u32, depth: u32, replica: u32) -> Self {
        Self { n_qbits, depth, replica }
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(n_qbits={}, depth={}, n={})", self.n_qbits, self.depth, self.replica)
    }
}

/// Inclusive integer range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepRange {
    pub min: u32,
    pub max: u32,
}

impl SweepRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Number of values in the range; zero when inverted.
    pub fn extent(&self) -> usize {
        if self.min > self.max {
            0
        } else {
            (self.max - self.min) as usize + 1
        }
    }

    pub fn values(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }

    fn validate(&self, field: &str, flag: &str) -> Result<()> {
        if self.min == 0 {
            return Err(QbenchError::invalid_config(
                field,
                "minimum must be at least 1",
                format!("Use --min-{flag} 1 or higher"),
            ));
        }
        if self.min > self.max {
            return Err(QbenchError::invalid_config(
                field,
                format!("minimum {} exceeds maximum {}", self.min, self.max),
                format!("Swap --min-{flag} and --max-{flag}"),
            ));
        }
        Ok(())
    }
}

impl From<RangeInclusive<u32>> for SweepRange {
    fn from(range: RangeInclusive<u32>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

/// The three inputs of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepPlan {
    /// Qubit-count range
    pub qubits: SweepRange,
    /// Depth range
    pub depth: SweepRange,
    /// Number of circuits per (qubits, depth) cell
    pub replicas: u32,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self { qubits: SweepRange::new(1, 10), depth: SweepRange::new(1, 10), replicas: 10 }
    }
}

impl SweepPlan {
    pub fn new(qubits: impl Into<SweepRange>, depth: impl Into<SweepRange>, replicas: u32) -> Self {
        Self { qubits: qubits.into(), depth: depth.into(), replicas }
    }

    pub fn validate(&self) -> Result<()> {
        self.qubits.validate("qubits", "qbits")?;
        self.depth.validate("depth", "depth")?;
        if self.replicas == 0 {
            return Err(QbenchError::invalid_config(
                "n_circuits",
                "replica count must be positive",
                "Use --n-circuits 1 or higher",
            ));
        }
        Ok(())
    }

    /// Total number of units in the sweep.
    pub fn len(&self) -> usize {
        self.qubits.extent() * self.depth.extent() * self.replicas as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate and enumerate the plan.
    pub fn parameters(&self) -> Result<Vec<SweepParameter>> {
        self.validate()?;

        let mut out = Vec::with_capacity(self.len());
        for n_qbits in self.qubits.values() {
            for depth in self.depth.values() {
                for replica in 1..=self.replicas {
                    out.push(SweepParameter { n_qbits, depth, replica });
                }
            }
        }
        Ok(out)
    }
}

/// Enumerate every `(n_qbits, depth, replica)` triple of a sweep, in
/// lexicographic order.
///
/// Fails with [`QbenchError::InvalidConfiguration`] when a range is inverted
/// or starts at zero, or when `n_replicas` is zero.
pub fn enumerate(
    qubits: impl Into<SweepRange>,
    depth: impl Into<SweepRange>,
    n_replicas: u32,
) -> Result<Vec<SweepParameter>> {
    SweepPlan::new(qubits, depth, n_replicas).parameters()
}
