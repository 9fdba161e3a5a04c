//! Circuit instructions combining gates with operands.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, GateKind, StandardGate};
use crate::qubit::QubitId;

/// A gate applied to target qubits, optionally conditioned on a bit pattern
/// of control qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The gate.
    pub gate: Gate,
    /// Target qubits, in the order the gate expects them.
    pub qubits: Vec<QubitId>,
    /// Control qubits, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<QubitId>,
    /// Required value of each control qubit (`true` = `|1⟩`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_values: Vec<bool>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            gate: gate.into(),
            qubits: qubits.into_iter().collect(),
            controls: vec![],
            control_values: vec![],
        }
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Condition this instruction on `controls` matching `values`.
    ///
    /// The new controls are placed in front of any existing ones, so nesting
    /// keeps the outermost condition first.
    pub fn controlled(mut self, controls: &[QubitId], values: &[bool]) -> IrResult<Self> {
        if controls.len() != values.len() {
            return Err(IrError::ControlPatternMismatch {
                controls: controls.len(),
                values: values.len(),
            });
        }
        self.controls.splice(0..0, controls.iter().copied());
        self.control_values.splice(0..0, values.iter().copied());
        Ok(self)
    }

    /// Check if this instruction carries any controls.
    pub fn is_controlled(&self) -> bool {
        !self.controls.is_empty()
    }

    /// All wires touched: controls first, then targets.
    pub fn wires(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.controls.iter().chain(self.qubits.iter()).copied()
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        self.gate.name()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_controlled() {
            let pattern: Vec<String> = self
                .controls
                .iter()
                .zip(&self.control_values)
                .map(|(q, v)| format!("{q}={}", u8::from(*v)))
                .collect();
            write!(f, "ctrl({}) ", pattern.join(","))?;
        }
        write!(f, "{}", self.name())?;
        if self.gate.adjoint {
            write!(f, "_dg")?;
        }
        if let GateKind::Standard(StandardGate::Ry(angle) | StandardGate::GlobalPhase(angle)) =
            &self.gate.kind
        {
            write!(f, "({angle:.6})")?;
        }
        if !self.qubits.is_empty() {
            let targets: Vec<String> = self.qubits.iter().map(ToString::to_string).collect();
            write!(f, " {}", targets.join(","))?;
        }
        Ok(())
    }
}
