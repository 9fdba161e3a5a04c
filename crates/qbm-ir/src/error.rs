//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit:?} not found in circuit{}", format_gate_context(.gate_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation (targets and controls included).
    #[error("Duplicate qubit {qubit:?} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Control qubits and control values differ in length.
    #[error("Control pattern has {values} values for {controls} control qubits")]
    ControlPatternMismatch {
        /// Number of control qubits.
        controls: usize,
        /// Number of control values.
        values: usize,
    },

    /// Amplitude vector rejected by state preparation.
    #[error("Invalid state-preparation amplitudes: {0}")]
    InvalidAmplitudes(String),

    /// Matrix rejected by the block-encoding gate.
    #[error("Invalid block-encoding matrix: {0}")]
    InvalidMatrix(String),

    /// An instruction must touch at least one wire.
    #[error("Gate '{0}' acts on no qubits")]
    EmptyInstruction(String),

    /// Invalid DAG structure.
    #[error("Invalid DAG structure: {0}")]
    InvalidDag(String),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
