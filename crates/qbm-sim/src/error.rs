//! Error types for the simulator.

use qbm_ir::QubitId;
use thiserror::Error;

/// Errors produced while simulating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The dense representation would be too large.
    #[error("Cannot simulate {requested} qubits (maximum {max})")]
    TooManyQubits {
        /// Number of qubits requested.
        requested: usize,
        /// Largest supported register.
        max: usize,
    },

    /// An instruction touches a qubit outside the simulated wire list.
    #[error("Qubit {0} is not part of the simulated wires")]
    UnmappedQubit(QubitId),

    /// The same qubit appears twice in the simulated wire list.
    #[error("Qubit {0} appears more than once in the wire list")]
    DuplicateWire(QubitId),

    /// A block-encoded matrix has no unitary dilation.
    #[error("Cannot dilate block-encoded matrix: {0}")]
    InvalidDilation(String),

    /// LAPACK failed on a dilation block.
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] ndarray_linalg::error::LinalgError),

    /// Circuit IR error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qbm_ir::IrError),
}

/// Result type for simulation.
pub type SimResult<T> = Result<T, SimError>;
