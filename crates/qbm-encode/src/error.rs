//! Error types for Hamiltonian construction and block encoding.

use thiserror::Error;

use qbm_ir::QubitId;

use crate::block_encode::Register;

/// Errors produced while building a Hamiltonian or emitting a block encoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// Terms and coefficients are not paired one-to-one.
    #[error("Got {terms} Pauli strings but {coefficients} coefficients")]
    LengthMismatch {
        /// Number of Pauli strings.
        terms: usize,
        /// Number of coefficients.
        coefficients: usize,
    },

    /// Hamiltonian contains no terms.
    #[error("Hamiltonian is empty, at least one term is required")]
    EmptyHamiltonian,

    /// A Pauli string has no characters.
    #[error("Pauli string must act on at least one qubit")]
    EmptyTerm,

    /// Pauli strings differ in length.
    #[error("Pauli string {index} has length {got}, expected {expected}")]
    NonUniformTerm {
        /// Index of the offending term.
        index: usize,
        /// Length of the first term.
        expected: usize,
        /// Length of the offending term.
        got: usize,
    },

    /// A character outside `{I, X, Y, Z}`.
    #[error("Invalid Pauli character '{character}' in \"{term}\"")]
    InvalidPauliChar {
        /// The offending character.
        character: char,
        /// The string it appeared in.
        term: String,
    },

    /// A coefficient is NaN or infinite.
    #[error("Coefficient {index} is not finite: {value}")]
    NonFiniteCoefficient {
        /// Index of the offending coefficient.
        index: usize,
        /// Its value.
        value: f64,
    },

    /// Scheme name not recognised.
    #[error("Unknown block-encoding scheme \"{0}\" (expected \"general\" or \"lcu\")")]
    UnknownScheme(String),

    /// Register name not recognised.
    #[error("Unknown register \"{0}\" (expected \"enc\", \"encoding\", \"sys\" or \"system\")")]
    UnknownRegister(String),

    /// Preprocessing requires δ < 1.
    #[error("Preprocessing parameter delta must be < 1, got {0}")]
    InvalidDelta(f64),

    /// Term index past the end of the Hamiltonian.
    #[error("Term index {index} out of range for {n_params} terms")]
    TermOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of terms.
        n_params: usize,
    },

    /// All coefficients are zero, so the Hamiltonian cannot be normalised.
    #[error("Hamiltonian has zero norm and cannot be normalised")]
    ZeroNorm,

    /// A register was given the wrong number of wires.
    #[error("{register} register needs {expected} wires, got {got}")]
    WireCountMismatch {
        /// The register.
        register: Register,
        /// Required width.
        expected: usize,
        /// Supplied width.
        got: usize,
    },

    /// A wire appears in both the encoding and the system register.
    #[error("Qubit {0} is used by both the encoding and the system register")]
    OverlappingWires(QubitId),

    /// A Pauli string was applied to a wire list of a different length.
    #[error("Pauli string of length {pauli} applied to {wires} wires")]
    PauliLengthMismatch {
        /// Length of the Pauli string.
        pauli: usize,
        /// Number of wires supplied.
        wires: usize,
    },

    /// Circuit builder returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qbm_ir::IrError),
}

/// Result type for encoding operations.
pub type EncodeResult<T> = Result<T, EncodeError>;
