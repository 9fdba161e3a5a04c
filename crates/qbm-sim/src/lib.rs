//! Dense simulation of qbm circuits.
//!
//! Provides a big-endian [`Statevector`] engine that understands every gate
//! the circuit IR can hold, including state preparation (through its RY
//! decomposition) and block encodings (through a unitary dilation), plus
//! helpers to extract a circuit's full unitary and its leading block.
//!
//! # Example
//!
//! ```rust
//! use qbm_ir::{Circuit, QubitId};
//! use qbm_sim::{circuit_unitary, leading_block};
//!
//! let mut circuit = Circuit::with_size("flip", 2);
//! circuit.x(QubitId(1)).unwrap();
//!
//! let u = circuit_unitary(&circuit, &[QubitId(0), QubitId(1)]).unwrap();
//! let block = leading_block(&u, 2);
//! assert!((block[[1, 0]].re - 1.0).abs() < 1e-12);
//! ```

pub mod error;
pub mod linalg;
pub mod statevector;
pub mod unitary;

pub use error::{SimError, SimResult};
pub use statevector::{Layout, MAX_QUBITS, Statevector, layout};
pub use unitary::{circuit_unitary, leading_block, run};
