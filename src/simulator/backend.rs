//! The state-vector work function used by `qbench run`.

use std::time::Instant;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use super::circuit::{random_circuit, transpile};
use super::statevector::simulate;
use super::{is_supported_device, SimulationError, SimulatorMethod, MAX_QUBITS};
use crate::record::ResultRecord;
use crate::runner::SweepWork;
use crate::sweep::SweepParameter;

/// Name reported in the `results.backend_name` field.
pub const BACKEND_NAME: &str = "qbench_statevector";

/// Derive the RNG seed of one sweep unit from the run's base seed.
///
/// Replicas of the same shape get distinct circuits; the same unit gets the
/// same circuit on every run.
pub fn circuit_seed(base: u64, parameter: &SweepParameter) -> u64 {
    let packed = (u64::from(parameter.n_qbits) << 42)
        ^ (u64::from(parameter.depth) << 21)
        ^ u64::from(parameter.replica);
    splitmix64(base ^ splitmix64(packed))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn resident_memory() -> Option<u64> {
    memory_stats::memory_stats().map(|stats| stats.physical_mem as u64)
}

/// Random-circuit benchmark on the dense state-vector engine.
///
/// For each unit: generate a seeded random circuit, then time transpilation
/// plus `n_shots` shots of simulation.
#[derive(Debug, Clone)]
pub struct StatevectorBackend {
    n_shots: u32,
    method: SimulatorMethod,
    device: String,
    seed: u64,
}

impl StatevectorBackend {
    /// Fails when the method or device cannot run on the built-in engine.
    pub fn new(
        n_shots: u32,
        method: SimulatorMethod,
        device: impl Into<String>,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        let device = device.into();
        if !method.is_supported() {
            return Err(SimulationError::UnsupportedMethod(method));
        }
        if !is_supported_device(&device) {
            return Err(SimulationError::UnsupportedDevice(device));
        }
        Ok(Self { n_shots, method, device, seed })
    }

    pub fn n_shots(&self) -> u32 {
        self.n_shots
    }

    pub fn method(&self) -> SimulatorMethod {
        self.method
    }

    pub fn device(&self) -> &str {
        &self.device
    }
}

impl SweepWork for StatevectorBackend {
    type Error = SimulationError;

    fn execute(&mut self, parameter: &SweepParameter) -> Result<ResultRecord, SimulationError> {
        let n_qbits = parameter.n_qbits as usize;
        if n_qbits > MAX_QUBITS {
            return Err(SimulationError::TooManyQubits { n_qbits, max: MAX_QUBITS });
        }

        let seed = circuit_seed(self.seed, parameter);
        let mut rng = StdRng::seed_from_u64(seed);
        let circuit = random_circuit(n_qbits, parameter.depth as usize, true, &mut rng);

        let start = Instant::now();
        let circuit = transpile(&circuit);
        let counts = simulate(&circuit, self.n_shots, &mut rng)?;
        let time_taken = start.elapsed().as_secs_f64();

        tracing::trace!(%parameter, gates = circuit.gate_count(), time_taken, "unit simulated");

        let results = json!({
            "backend_name": BACKEND_NAME,
            "date": Utc::now().to_rfc3339(),
            "seed": seed,
            "shots": self.n_shots,
            "success": true,
            "time_taken": time_taken,
            "counts": counts,
        });

        Ok(ResultRecord::new(*parameter, time_taken)
            .with_memory(resident_memory())
            .with_field("circuit", circuit.to_qasm3())
            .with_field("device", self.device.clone())
            .with_field("method", self.method.as_str())
            .with_field("n_shots", self.n_shots)
            .with_field("results", results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn backend() -> StatevectorBackend {
        StatevectorBackend::new(64, SimulatorMethod::Statevector, "CPU", 0).unwrap()
    }

    #[test]
    fn test_record_carries_result_fields() {
        let p = SweepParameter::new(3, 2, 1);
        let record = backend().execute(&p).unwrap();

        assert_eq!(record.key(), p);
        assert!(record.time_taken >= 0.0);
        assert_eq!(record.field("device"), Some(&json!("CPU")));
        assert_eq!(record.field("method"), Some(&json!("statevector")));
        assert_eq!(record.field("n_shots"), Some(&json!(64)));

        let circuit = record.field("circuit").and_then(Value::as_str).unwrap();
        assert!(circuit.starts_with("OPENQASM 3.0;"));

        let results = record.field("results").unwrap();
        assert_eq!(results["success"], json!(true));
        let total: u64 = results["counts"].as_object().unwrap().values().map(|v| v.as_u64().unwrap()).sum();
        assert_eq!(total, 64);
    }

    #[test]
    fn test_same_unit_same_circuit() {
        let p = SweepParameter::new(4, 3, 2);
        let a = backend().execute(&p).unwrap();
        let b = backend().execute(&p).unwrap();
        assert_eq!(a.field("circuit"), b.field("circuit"));
        assert_eq!(a.field("results").unwrap()["counts"], b.field("results").unwrap()["counts"]);
    }

    #[test]
    fn test_replicas_get_distinct_seeds() {
        let a = circuit_seed(0, &SweepParameter::new(4, 3, 1));
        let b = circuit_seed(0, &SweepParameter::new(4, 3, 2));
        let c = circuit_seed(1, &SweepParameter::new(4, 3, 1));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let err = StatevectorBackend::new(10, SimulatorMethod::Stabilizer, "CPU", 0).unwrap_err();
        assert_eq!(err, SimulationError::UnsupportedMethod(SimulatorMethod::Stabilizer));
    }

    #[test]
    fn test_unsupported_device_rejected() {
        let err = StatevectorBackend::new(10, SimulatorMethod::Automatic, "GPU", 0).unwrap_err();
        assert!(err.to_string().contains("GPU"));
    }

    #[test]
    fn test_too_many_qubits_fails_the_unit() {
        let err = backend().execute(&SweepParameter::new(MAX_QUBITS as u32 + 1, 1, 1)).unwrap_err();
        assert!(matches!(err, SimulationError::TooManyQubits { .. }));
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = backend().execute(&SweepParameter::new(1, 1, 1)).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        for key in ["n_qbits", "depth", "replica", "time_taken", "circuit", "device", "method", "n_shots", "results"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
