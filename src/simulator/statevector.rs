//! Dense state-vector engine.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;
use rand::Rng;

use super::circuit::{Circuit, Gate, Instruction};
use super::{SimulationError, MAX_QUBITS};

/// Measurement counts keyed by classical register bitstring (bit 0 rightmost).
pub type Counts = BTreeMap<String, u64>;

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// `2^n` complex amplitudes, qubit `k` being bit `k` of the basis index.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVector {
    n_qbits: usize,
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// The all-zero state `|0…0⟩`.
    pub fn new(n_qbits: usize) -> Result<Self, SimulationError> {
        if n_qbits > MAX_QUBITS {
            return Err(SimulationError::TooManyQubits { n_qbits, max: MAX_QUBITS });
        }
        let mut amplitudes = vec![ZERO; 1 << n_qbits];
        amplitudes[0] = ONE;
        Ok(Self { n_qbits, amplitudes })
    }

    pub fn n_qbits(&self) -> usize {
        self.n_qbits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Bytes held by the amplitude buffer.
    pub fn size_bytes(&self) -> usize {
        self.amplitudes.len() * std::mem::size_of::<Complex64>()
    }

    /// Apply a basis gate.
    pub fn apply(&mut self, gate: &Gate, qubits: &[usize]) -> Result<(), SimulationError> {
        if qubits.len() != gate.arity() || qubits.iter().any(|&q| q >= self.n_qbits) {
            return Err(SimulationError::InvalidOperands {
                gate: gate.name(),
                qubits: qubits.to_vec(),
                n_qbits: self.n_qbits,
            });
        }
        match (gate, qubits) {
            (Gate::Cx, &[control, target]) => {
                self.apply_cx(control, target);
                Ok(())
            }
            (_, &[target]) => {
                let matrix = single_qubit_matrix(gate).ok_or(SimulationError::NotInBasis(gate.name()))?;
                self.apply_matrix(&matrix, target);
                Ok(())
            }
            _ => Err(SimulationError::NotInBasis(gate.name())),
        }
    }

    fn apply_matrix(&mut self, m: &Matrix2, target: usize) {
        let mask = 1usize << target;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let (a, b) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let (c, t) = (1usize << control, 1usize << target);
        for i in 0..self.amplitudes.len() {
            if i & c != 0 && i & t == 0 {
                self.amplitudes.swap(i, i | t);
            }
        }
    }

    /// Measure `qubit`, collapsing the state. Returns the outcome.
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> bool {
        let mask = 1usize << qubit;
        let p_one: f64 = self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum();
        let outcome = rng.gen::<f64>() < p_one;
        let p = if outcome { p_one } else { 1.0 - p_one };

        let scale = if p > 0.0 { 1.0 / p.sqrt() } else { 0.0 };
        for (i, amplitude) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                *amplitude *= scale;
            } else {
                *amplitude = ZERO;
            }
        }
        outcome
    }

    /// Draw `shots` basis indices from the measurement distribution.
    pub fn sample<R: Rng + ?Sized>(&self, shots: u32, rng: &mut R) -> Vec<usize> {
        let mut cumulative = Vec::with_capacity(self.amplitudes.len());
        let mut total = 0.0;
        for amplitude in &self.amplitudes {
            total += amplitude.norm_sqr();
            cumulative.push(total);
        }

        let last = self.amplitudes.len() - 1;
        (0..shots)
            .map(|_| {
                let r = rng.gen::<f64>() * total;
                cumulative.partition_point(|&c| c <= r).min(last)
            })
            .collect()
    }
}

fn single_qubit_matrix(gate: &Gate) -> Option<Matrix2> {
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    let m = match *gate {
        Gate::Id => [[ONE, ZERO], [ZERO, ONE]],
        Gate::X => [[ZERO, ONE], [ONE, ZERO]],
        Gate::Y => [[ZERO, -I], [I, ZERO]],
        Gate::Z => [[ONE, ZERO], [ZERO, -ONE]],
        Gate::H => [[h, h], [h, -h]],
        Gate::S => [[ONE, ZERO], [ZERO, I]],
        Gate::Sdg => [[ONE, ZERO], [ZERO, -I]],
        Gate::T => [[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)]],
        Gate::Tdg => [[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, -std::f64::consts::FRAC_PI_4)]],
        Gate::Sx => {
            let p = Complex64::new(0.5, 0.5);
            let q = Complex64::new(0.5, -0.5);
            [[p, q], [q, p]]
        }
        Gate::Rx(theta) => {
            let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
            [[Complex64::new(c, 0.0), Complex64::new(0.0, -s)], [Complex64::new(0.0, -s), Complex64::new(c, 0.0)]]
        }
        Gate::Ry(theta) => {
            let (c, s) = ((theta / 2.0).cos(), (theta / 2.0).sin());
            [[Complex64::new(c, 0.0), Complex64::new(-s, 0.0)], [Complex64::new(s, 0.0), Complex64::new(c, 0.0)]]
        }
        Gate::Rz(theta) => [
            [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
            [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
        ],
        Gate::Cx | Gate::Cz | Gate::Swap | Gate::Crz(_) => return None,
    };
    Some(m)
}

/// Simulate `circuit` for `shots` shots and count classical register values.
///
/// Circuits whose measurements are all terminal are evolved once and
/// sampled; circuits with mid-circuit measurements are re-run per shot.
pub fn simulate<R: Rng + ?Sized>(
    circuit: &Circuit,
    shots: u32,
    rng: &mut R,
) -> Result<Counts, SimulationError> {
    let n = circuit.n_qbits();
    let mut counts = Counts::new();

    if circuit.has_mid_circuit_measurement() {
        for _ in 0..shots {
            let mut state = StateVector::new(n)?;
            let register = run_shot(&mut state, circuit, rng)?;
            *counts.entry(bitstring(register, n)).or_insert(0) += 1;
        }
        return Ok(counts);
    }

    let mut state = StateVector::new(n)?;
    let mut measured = Vec::new();
    for instruction in circuit.instructions() {
        match instruction {
            Instruction::Gate { gate, qubits, condition } => {
                // No measurement has happened yet, so the register reads zero.
                if condition.map_or(true, |value| value == 0) {
                    state.apply(gate, qubits)?;
                }
            }
            Instruction::Measure { qubit, clbit } => measured.push((*qubit, *clbit)),
        }
    }

    for index in state.sample(shots, rng) {
        let register = measured
            .iter()
            .filter(|&&(qubit, _)| index & (1usize << qubit) != 0)
            .fold(0u64, |acc, &(_, clbit)| acc | (1u64 << clbit));
        *counts.entry(bitstring(register, n)).or_insert(0) += 1;
    }
    Ok(counts)
}

fn run_shot<R: Rng + ?Sized>(
    state: &mut StateVector,
    circuit: &Circuit,
    rng: &mut R,
) -> Result<u64, SimulationError> {
    let mut register = 0u64;
    for instruction in circuit.instructions() {
        match instruction {
            Instruction::Gate { gate, qubits, condition } => {
                if condition.map_or(true, |value| value == register) {
                    state.apply(gate, qubits)?;
                }
            }
            Instruction::Measure { qubit, clbit } => {
                if state.measure(*qubit, rng) {
                    register |= 1u64 << clbit;
                } else {
                    register &= !(1u64 << clbit);
                }
            }
        }
    }
    Ok(register)
}

fn bitstring(register: u64, width: usize) -> String {
    format!("{register:0width$b}")
}
