//! Circuits, random circuit generation and basis transpilation.

use std::f64::consts::TAU;
use std::fmt::Write as _;

use rand::seq::SliceRandom;
use rand::Rng;

use super::SimulationError;

/// Probability that a generated operation is classically conditioned.
pub const CONDITIONAL_PROBABILITY: f64 = 0.1;

/// Gates produced by the random generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    Id,
    X,
    Y,
    Z,
    H,
    S,
    Sdg,
    T,
    Tdg,
    Sx,
    Rx(f64),
    Ry(f64),
    Rz(f64),
    Cx,
    Cz,
    Swap,
    Crz(f64),
}

impl Gate {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::H => "h",
            Self::S => "s",
            Self::Sdg => "sdg",
            Self::T => "t",
            Self::Tdg => "tdg",
            Self::Sx => "sx",
            Self::Rx(_) => "rx",
            Self::Ry(_) => "ry",
            Self::Rz(_) => "rz",
            Self::Cx => "cx",
            Self::Cz => "cz",
            Self::Swap => "swap",
            Self::Crz(_) => "crz",
        }
    }

    /// Number of qubit operands.
    pub fn arity(&self) -> usize {
        match self {
            Self::Cx | Self::Cz | Self::Swap | Self::Crz(_) => 2,
            _ => 1,
        }
    }

    pub fn angle(&self) -> Option<f64> {
        match self {
            Self::Rx(a) | Self::Ry(a) | Self::Rz(a) | Self::Crz(a) => Some(*a),
            _ => None,
        }
    }

    /// Whether the state-vector engine applies this gate directly.
    pub fn in_basis(&self) -> bool {
        !matches!(self, Self::Cz | Self::Swap | Self::Crz(_))
    }

    fn random_one_qubit<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..13) {
            0 => Self::Id,
            1 => Self::X,
            2 => Self::Y,
            3 => Self::Z,
            4 => Self::H,
            5 => Self::S,
            6 => Self::Sdg,
            7 => Self::T,
            8 => Self::Tdg,
            9 => Self::Sx,
            10 => Self::Rx(rng.gen_range(0.0..TAU)),
            11 => Self::Ry(rng.gen_range(0.0..TAU)),
            _ => Self::Rz(rng.gen_range(0.0..TAU)),
        }
    }

    fn random_two_qubit<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..4) {
            0 => Self::Cx,
            1 => Self::Cz,
            2 => Self::Swap,
            _ => Self::Crz(rng.gen_range(0.0..TAU)),
        }
    }
}

/// One circuit step.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// A gate, applied only when the classical register equals `condition`
    /// if one is set.
    Gate { gate: Gate, qubits: Vec<usize>, condition: Option<u64> },
    /// Measure `qubit` into classical bit `clbit`.
    Measure { qubit: usize, clbit: usize },
}

/// A circuit over `n_qbits` qubits and an equally sized classical register.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Circuit {
    n_qbits: usize,
    instructions: Vec<Instruction>,
}

impl Circuit {
    pub fn new(n_qbits: usize) -> Self {
        Self { n_qbits, instructions: Vec::new() }
    }

    pub fn n_qbits(&self) -> usize {
        self.n_qbits
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Append a gate after checking its operands.
    pub fn push_gate(
        &mut self,
        gate: Gate,
        qubits: &[usize],
        condition: Option<u64>,
    ) -> Result<(), SimulationError> {
        let distinct = qubits.len() < 2 || qubits[0] != qubits[1];
        if qubits.len() != gate.arity() || !distinct || qubits.iter().any(|&q| q >= self.n_qbits) {
            return Err(SimulationError::InvalidOperands {
                gate: gate.name(),
                qubits: qubits.to_vec(),
                n_qbits: self.n_qbits,
            });
        }
        self.gate(gate, qubits, condition);
        Ok(())
    }

    fn gate(&mut self, gate: Gate, qubits: &[usize], condition: Option<u64>) {
        self.instructions.push(Instruction::Gate { gate, qubits: qubits.to_vec(), condition });
    }

    /// Measure every qubit into the classical bit of the same index.
    pub fn measure_all(&mut self) {
        for qubit in 0..self.n_qbits {
            self.instructions.push(Instruction::Measure { qubit, clbit: qubit });
        }
    }

    /// Number of gate instructions.
    pub fn gate_count(&self) -> usize {
        self.instructions.iter().filter(|i| matches!(i, Instruction::Gate { .. })).count()
    }

    /// True when some gate follows a measurement, so that shots cannot share
    /// one evolved state.
    pub fn has_mid_circuit_measurement(&self) -> bool {
        let first_measure = self.instructions.iter().position(|i| matches!(i, Instruction::Measure { .. }));
        match first_measure {
            Some(pos) => self.instructions[pos..].iter().any(|i| matches!(i, Instruction::Gate { .. })),
            None => false,
        }
    }

    /// OpenQASM 3 source for this circuit.
    pub fn to_qasm3(&self) -> String {
        let mut out = String::from("OPENQASM 3.0;\ninclude \"stdgates.inc\";\n");
        let _ = writeln!(out, "bit[{}] c;", self.n_qbits);
        let _ = writeln!(out, "qubit[{}] q;", self.n_qbits);

        for instruction in &self.instructions {
            match instruction {
                Instruction::Gate { gate, qubits, condition } => {
                    let mut line = gate.name().to_string();
                    if let Some(angle) = gate.angle() {
                        let _ = write!(line, "({angle})");
                    }
                    let operands: Vec<String> = qubits.iter().map(|q| format!("q[{q}]")).collect();
                    let _ = write!(line, " {};", operands.join(", "));

                    match condition {
                        Some(value) => {
                            let _ = writeln!(out, "if (c == {value}) {{\n  {line}\n}}");
                        }
                        None => {
                            let _ = writeln!(out, "{line}");
                        }
                    }
                }
                Instruction::Measure { qubit, clbit } => {
                    let _ = writeln!(out, "c[{clbit}] = measure q[{qubit}];");
                }
            }
        }
        out
    }
}

/// Generate a random circuit of `depth` layers over `n_qbits` qubits.
///
/// Each layer shuffles the qubits and splits them into one- and two-qubit
/// operations. When `conditional` is set, each operation is conditioned on
/// the classical register with probability [`CONDITIONAL_PROBABILITY`], and
/// a layer with conditioned operations starts by measuring every qubit.
/// Every qubit is measured at the end.
pub fn random_circuit<R: Rng + ?Sized>(
    n_qbits: usize,
    depth: usize,
    conditional: bool,
    rng: &mut R,
) -> Circuit {
    let mut circuit = Circuit::new(n_qbits);
    let register_values = 1u64 << n_qbits.min(63);

    for _ in 0..depth {
        let mut qubits: Vec<usize> = (0..n_qbits).collect();
        qubits.shuffle(rng);

        let mut layer = Vec::new();
        let mut rest = qubits.as_slice();
        while !rest.is_empty() {
            let arity = if rest.len() >= 2 && rng.gen_bool(0.5) { 2 } else { 1 };
            let (operands, tail) = rest.split_at(arity);
            rest = tail;

            let gate = if arity == 2 { Gate::random_two_qubit(rng) } else { Gate::random_one_qubit(rng) };
            let condition = (conditional && rng.gen_bool(CONDITIONAL_PROBABILITY))
                .then(|| rng.gen_range(0..register_values));
            layer.push((gate, operands.to_vec(), condition));
        }

        if layer.iter().any(|(_, _, condition)| condition.is_some()) {
            circuit.measure_all();
        }
        for (gate, operands, condition) in layer {
            circuit.gate(gate, &operands, condition);
        }
    }

    circuit.measure_all();
    circuit
}

/// Rewrite `circuit` into the engine basis.
///
/// `swap` becomes three `cx`, `cz` becomes `h·cx·h` and `crz(θ)` becomes
/// `rz(θ/2)·cx·rz(-θ/2)·cx` on the target. Conditions carry over to every
/// emitted gate.
pub fn transpile(circuit: &Circuit) -> Circuit {
    let mut out = Circuit::new(circuit.n_qbits);

    for instruction in &circuit.instructions {
        let Instruction::Gate { gate, qubits, condition } = instruction else {
            out.instructions.push(instruction.clone());
            continue;
        };
        let condition = *condition;

        match (*gate, qubits.as_slice()) {
            (Gate::Swap, &[a, b]) => {
                out.gate(Gate::Cx, &[a, b], condition);
                out.gate(Gate::Cx, &[b, a], condition);
                out.gate(Gate::Cx, &[a, b], condition);
            }
            (Gate::Cz, &[control, target]) => {
                out.gate(Gate::H, &[target], condition);
                out.gate(Gate::Cx, &[control, target], condition);
                out.gate(Gate::H, &[target], condition);
            }
            (Gate::Crz(theta), &[control, target]) => {
                out.gate(Gate::Rz(theta / 2.0), &[target], condition);
                out.gate(Gate::Cx, &[control, target], condition);
                out.gate(Gate::Rz(-theta / 2.0), &[target], condition);
                out.gate(Gate::Cx, &[control, target], condition);
            }
            _ => out.instructions.push(instruction.clone()),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gates(circuit: &Circuit) -> Vec<(Gate, Vec<usize>, Option<u64>)> {
        circuit
            .instructions()
            .iter()
            .filter_map(|i| match i {
                Instruction::Gate { gate, qubits, condition } => Some((*gate, qubits.clone(), *condition)),
                Instruction::Measure { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_random_circuit_covers_every_qubit_per_layer() {
        let mut rng = StdRng::seed_from_u64(7);
        let circuit = random_circuit(5, 4, false, &mut rng);

        let operands: usize = gates(&circuit).iter().map(|(_, q, _)| q.len()).sum();
        assert_eq!(operands, 5 * 4);
        assert!(!circuit.has_mid_circuit_measurement());
    }

    #[test]
    fn test_random_circuit_ends_with_full_measurement() {
        let mut rng = StdRng::seed_from_u64(1);
        let circuit = random_circuit(3, 2, true, &mut rng);
        let tail = &circuit.instructions()[circuit.len() - 3..];
        for (i, instruction) in tail.iter().enumerate() {
            assert_eq!(instruction, &Instruction::Measure { qubit: i, clbit: i });
        }
    }

    #[test]
    fn test_random_circuit_is_reproducible() {
        let a = random_circuit(4, 6, true, &mut StdRng::seed_from_u64(42));
        let b = random_circuit(4, 6, true, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_qubit_circuit_has_only_one_qubit_gates() {
        let circuit = random_circuit(1, 20, false, &mut StdRng::seed_from_u64(3));
        assert!(gates(&circuit).iter().all(|(g, _, _)| g.arity() == 1));
    }

    #[test]
    fn test_conditioned_layers_measure_first() {
        // With enough layers some operation is conditioned.
        let circuit = random_circuit(3, 200, true, &mut StdRng::seed_from_u64(11));
        assert!(gates(&circuit).iter().any(|(_, _, c)| c.is_some()));
        assert!(circuit.has_mid_circuit_measurement());

        let first_conditioned = circuit
            .instructions()
            .iter()
            .position(|i| matches!(i, Instruction::Gate { condition: Some(_), .. }))
            .unwrap();
        assert!(circuit.instructions()[..first_conditioned]
            .iter()
            .any(|i| matches!(i, Instruction::Measure { .. })));
    }

    #[test]
    fn test_transpile_rewrites_into_basis() {
        let mut circuit = Circuit::new(2);
        circuit.push_gate(Gate::Swap, &[0, 1], None).unwrap();
        circuit.push_gate(Gate::Cz, &[0, 1], Some(2)).unwrap();
        circuit.push_gate(Gate::Crz(1.0), &[1, 0], None).unwrap();
        circuit.measure_all();

        let out = transpile(&circuit);
        let g = gates(&out);

        assert!(g.iter().all(|(gate, _, _)| gate.in_basis()));
        assert_eq!(g.len(), 3 + 3 + 4);
        assert_eq!(g[1], (Gate::Cx, vec![1, 0], None));
        assert!(g[3..6].iter().all(|(_, _, c)| *c == Some(2)));
        assert_eq!(g[6], (Gate::Rz(0.5), vec![0], None));
        assert_eq!(out.len(), g.len() + 2);
    }

    #[test]
    fn test_push_gate_validates_operands() {
        let mut circuit = Circuit::new(2);
        assert!(circuit.push_gate(Gate::Cx, &[0, 0], None).is_err());
        assert!(circuit.push_gate(Gate::H, &[2], None).is_err());
        assert!(circuit.push_gate(Gate::Cx, &[0], None).is_err());
        assert!(circuit.push_gate(Gate::Rx(0.1), &[1], Some(1)).is_ok());
    }

    #[test]
    fn test_qasm3_output() {
        let mut circuit = Circuit::new(2);
        circuit.push_gate(Gate::H, &[0], None).unwrap();
        circuit.push_gate(Gate::Cx, &[0, 1], None).unwrap();
        circuit.push_gate(Gate::Rz(0.5), &[1], Some(3)).unwrap();
        circuit.measure_all();

        let qasm = circuit.to_qasm3();
        assert!(qasm.starts_with("OPENQASM 3.0;\ninclude \"stdgates.inc\";\n"));
        assert!(qasm.contains("bit[2] c;\nqubit[2] q;\n"));
        assert!(qasm.contains("h q[0];\ncx q[0], q[1];\n"));
        assert!(qasm.contains("if (c == 3) {\n  rz(0.5) q[1];\n}\n"));
        assert!(qasm.ends_with("c[0] = measure q[0];\nc[1] = measure q[1];\n"));
    }
}
