// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum beats circuit description.
//!
//! The experiment uses a single two-qubit circuit, parameterized by the phase
//! `λ = ω_larmor · t` accumulated during one time step:
//!
//! ```text
//! q0: ─X─────⊕───────────●──S──H──●──T───●──H──●───────── M
//!            │           │        │      │     │
//! q1: ───H───●──Z──P(λ)──⊕──S─────⊕──T†──⊕─────⊕──S†───── M
//!     └── singlet ──┘ └λ┘└──── singlet/triplet basis ───┘
//! ```
//!
//! The basis change maps the singlet to `|10⟩` (record `(1, 0)`) and the
//! m=0 triplet to `|01⟩` (record `(0, 1)`).
//!
//! Reference: arXiv:1206.0758 for the two-qubit basis-change decomposition.

use std::fmt;

use crate::distribution::OutcomeRecord;

/// Gate of the quantum beats circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    X(u32),
    H(u32),
    Z(u32),
    S(u32),
    Sdg(u32),
    T(u32),
    Tdg(u32),
    /// Phase rotation diag(1, e^{iλ})
    Phase { qubit: u32, angle: f64 },
    Cnot { control: u32, target: u32 },
}

impl Gate {
    /// Qubits the gate acts on.
    pub fn qubits(&self) -> Vec<u32> {
        match *self {
            Gate::X(q)
            | Gate::H(q)
            | Gate::Z(q)
            | Gate::S(q)
            | Gate::Sdg(q)
            | Gate::T(q)
            | Gate::Tdg(q) => vec![q],
            Gate::Phase { qubit, .. } => vec![qubit],
            Gate::Cnot { control, target } => vec![control, target],
        }
    }

    fn to_qasm(self) -> String {
        match self {
            Gate::X(q) => format!("x q[{q}];"),
            Gate::H(q) => format!("h q[{q}];"),
            Gate::Z(q) => format!("z q[{q}];"),
            Gate::S(q) => format!("s q[{q}];"),
            Gate::Sdg(q) => format!("sdg q[{q}];"),
            Gate::T(q) => format!("t q[{q}];"),
            Gate::Tdg(q) => format!("tdg q[{q}];"),
            Gate::Phase { qubit, angle } => format!("p({angle:.10}) q[{qubit}];"),
            Gate::Cnot { control, target } => format!("cx q[{control}], q[{target}];"),
        }
    }

    fn to_quil(self) -> String {
        // Quil's standard set has no S† or T†; use the equivalent phase gates.
        match self {
            Gate::X(q) => format!("X {q}"),
            Gate::H(q) => format!("H {q}"),
            Gate::Z(q) => format!("Z {q}"),
            Gate::S(q) => format!("S {q}"),
            Gate::Sdg(q) => format!("PHASE(-pi/2) {q}"),
            Gate::T(q) => format!("T {q}"),
            Gate::Tdg(q) => format!("PHASE(-pi/4) {q}"),
            Gate::Phase { qubit, angle } => format!("PHASE({angle:.10}) {qubit}"),
            Gate::Cnot { control, target } => format!("CNOT {control} {target}"),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Phase { qubit, angle } => write!(f, "phase({:.4}) q{}", angle, qubit),
            Gate::Cnot { control, target } => write!(f, "cnot(q{}, q{})", control, target),
            other => {
                let name = match other {
                    Gate::X(_) => "x",
                    Gate::H(_) => "h",
                    Gate::Z(_) => "z",
                    Gate::S(_) => "s",
                    Gate::Sdg(_) => "sdg",
                    Gate::T(_) => "t",
                    _ => "tdg",
                };
                write!(f, "{}(q{})", name, other.qubits()[0])
            }
        }
    }
}

/// A fixed gate sequence followed by measurement of every listed qubit.
///
/// Qubit `measured[i]` is read into classical bit `i`, which becomes position
/// `i` of each [`OutcomeRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Circuit name used in job submissions
    pub name: String,
    /// Number of qubits
    pub num_qubits: u32,
    /// Gates in application order
    pub gates: Vec<Gate>,
    /// Measured qubits, in classical-bit order
    pub measured: Vec<u32>,
}

impl Circuit {
    /// Build the quantum beats circuit for a time-step phase `lambda`.
    pub fn quantum_beats(lambda: f64) -> Self {
        let gates = vec![
            // Singlet (|01⟩ - |10⟩)/√2
            Gate::X(0),
            Gate::H(1),
            Gate::Cnot {
                control: 1,
                target: 0,
            },
            Gate::Z(1),
            // Time step
            Gate::Phase {
                qubit: 1,
                angle: lambda,
            },
            // Singlet/triplet basis change
            Gate::Cnot {
                control: 0,
                target: 1,
            },
            Gate::S(0),
            Gate::S(1),
            Gate::H(0),
            Gate::Cnot {
                control: 0,
                target: 1,
            },
            Gate::T(0),
            Gate::Tdg(1),
            Gate::Cnot {
                control: 0,
                target: 1,
            },
            Gate::H(0),
            Gate::Cnot {
                control: 0,
                target: 1,
            },
            Gate::Sdg(1),
        ];

        Self {
            name: format!("quantum_beats_{lambda:.4}"),
            num_qubits: 2,
            gates,
            measured: vec![0, 1],
        }
    }

    /// Width of the outcome records this circuit produces.
    pub fn num_clbits(&self) -> usize {
        self.measured.len()
    }

    /// Highest qubit index referenced, if any.
    pub fn max_qubit(&self) -> Option<u32> {
        self.gates
            .iter()
            .flat_map(Gate::qubits)
            .chain(self.measured.iter().copied())
            .max()
    }

    /// Render as OpenQASM 3.0.
    pub fn to_qasm(&self) -> String {
        let mut qasm = String::from("OPENQASM 3.0;\n");
        qasm.push_str("include \"stdgates.inc\";\n");
        qasm.push_str(&format!("qubit[{}] q;\n", self.num_qubits));
        qasm.push_str(&format!("bit[{}] c;\n\n", self.num_clbits()));

        for gate in &self.gates {
            qasm.push_str(&gate.to_qasm());
            qasm.push('\n');
        }

        qasm.push('\n');
        for (i, q) in self.measured.iter().enumerate() {
            qasm.push_str(&format!("c[{i}] = measure q[{q}];\n"));
        }

        qasm
    }

    /// Render as a Quil program reading out into `ro`.
    pub fn to_quil(&self) -> String {
        let mut quil = format!("DECLARE ro BIT[{}]\n", self.num_clbits());

        for gate in &self.gates {
            quil.push_str(&gate.to_quil());
            quil.push('\n');
        }

        for (i, q) in self.measured.iter().enumerate() {
            quil.push_str(&format!("MEASURE {q} ro[{i}]\n"));
        }

        quil
    }
}

/// Named outcomes of the two-qubit beats measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeatsOutcome {
    /// Record (1, 0)
    Singlet,
    /// Record (0, 1)
    Triplet,
    /// Record (0, 0)
    ZeroZero,
    /// Record (1, 1)
    OneOne,
}

impl BeatsOutcome {
    /// All outcomes, in report column order.
    pub const ALL: [BeatsOutcome; 4] = [
        BeatsOutcome::Singlet,
        BeatsOutcome::Triplet,
        BeatsOutcome::ZeroZero,
        BeatsOutcome::OneOne,
    ];

    /// Bit pattern of the outcome, bit 0 first.
    pub fn bits(&self) -> [u8; 2] {
        match self {
            BeatsOutcome::Singlet => [1, 0],
            BeatsOutcome::Triplet => [0, 1],
            BeatsOutcome::ZeroZero => [0, 0],
            BeatsOutcome::OneOne => [1, 1],
        }
    }

    /// Record form of the outcome.
    pub fn record(&self) -> OutcomeRecord {
        OutcomeRecord::from_bools(&self.bits().map(|b| b == 1))
    }

    /// Column label.
    pub fn label(&self) -> &'static str {
        match self {
            BeatsOutcome::Singlet => "singlet",
            BeatsOutcome::Triplet => "triplet",
            BeatsOutcome::ZeroZero => "00",
            BeatsOutcome::OneOne => "11",
        }
    }
}

impl fmt::Display for BeatsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::BitOrder;
    use std::f64::consts::PI;

    #[test]
    fn test_quantum_beats_layout() {
        let c = Circuit::quantum_beats(0.0);
        assert_eq!(c.num_qubits, 2);
        assert_eq!(c.gates.len(), 16);
        assert_eq!(c.measured, vec![0, 1]);
        assert_eq!(c.num_clbits(), 2);
        assert_eq!(c.max_qubit(), Some(1));
    }

    #[test]
    fn test_phase_carries_lambda() {
        let c = Circuit::quantum_beats(0.92);
        let phase = c
            .gates
            .iter()
            .find_map(|g| match g {
                Gate::Phase { qubit, angle } => Some((*qubit, *angle)),
                _ => None,
            })
            .unwrap();
        assert_eq!(phase, (1, 0.92));
    }

    #[test]
    fn test_to_qasm() {
        let qasm = Circuit::quantum_beats(PI / 3.0).to_qasm();
        assert!(qasm.starts_with("OPENQASM 3.0;"));
        assert!(qasm.contains("qubit[2] q;"));
        assert!(qasm.contains("bit[2] c;"));
        assert!(qasm.contains("cx q[1], q[0];"));
        assert!(qasm.contains("p(1.0471975512) q[1];"));
        assert!(qasm.contains("sdg q[1];"));
        assert!(qasm.contains("c[0] = measure q[0];"));
        assert!(qasm.contains("c[1] = measure q[1];"));
    }

    #[test]
    fn test_to_quil() {
        let quil = Circuit::quantum_beats(0.46).to_quil();
        assert!(quil.starts_with("DECLARE ro BIT[2]\n"));
        assert!(quil.contains("CNOT 1 0\n"));
        assert!(quil.contains("PHASE(0.4600000000) 1\n"));
        assert!(quil.contains("PHASE(-pi/2) 1\n"));
        assert!(quil.contains("PHASE(-pi/4) 1\n"));
        assert!(quil.ends_with("MEASURE 0 ro[0]\nMEASURE 1 ro[1]\n"));
    }

    #[test]
    fn test_gate_display() {
        assert_eq!(Gate::H(1).to_string(), "h(q1)");
        assert_eq!(
            Gate::Cnot {
                control: 0,
                target: 1
            }
            .to_string(),
            "cnot(q0, q1)"
        );
        assert_eq!(
            Gate::Phase {
                qubit: 1,
                angle: 0.5
            }
            .to_string(),
            "phase(0.5000) q1"
        );
    }

    #[test]
    fn test_outcome_bitstrings() {
        // Qiskit count keys: singlet is '01', triplet is '10'
        assert_eq!(
            BeatsOutcome::Singlet.record().to_bitstring(BitOrder::QubitZeroRight),
            "01"
        );
        assert_eq!(
            BeatsOutcome::Triplet.record().to_bitstring(BitOrder::QubitZeroRight),
            "10"
        );
        assert_eq!(BeatsOutcome::OneOne.record().bits(), &[1, 1]);
    }
}
