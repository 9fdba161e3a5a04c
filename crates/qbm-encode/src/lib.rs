//! `qbm-encode` — LCU Hamiltonians and their unitary block encodings.
//!
//! A Hamiltonian given as a real linear combination of Pauli strings is
//! embedded, scaled by its L1 norm, as the top-left block of a unitary on an
//! encoding register and a system register. The unitary is emitted into a
//! `qbm_ir::Circuit`, so the result can be inspected, serialised or
//! simulated with `qbm-sim`.
//!
//! # Quick start
//!
//! ```rust
//! use qbm_encode::{BlockEncoder, EncodingScheme, Hamiltonian, Register};
//! use qbm_ir::Circuit;
//!
//! let h = Hamiltonian::transverse_field_ising(3, 1.0, 0.5).unwrap();
//! let encoder = BlockEncoder::from_hamiltonian(h, EncodingScheme::Lcu).unwrap();
//!
//! // Five terms need three encoding qubits.
//! let n_enc = encoder.n_qubits(&[Register::Encoding]);
//! let n_sys = encoder.n_qubits(&[Register::System]);
//! assert_eq!((n_enc, n_sys), (3, 3));
//!
//! let mut circuit = Circuit::new("tfi");
//! let enc = circuit.add_qreg("enc", n_enc as u32);
//! let sys = circuit.add_qreg("sys", n_sys as u32);
//! encoder.circuit(&mut circuit, &enc, &sys).unwrap();
//! ```

pub mod bits;
pub mod block_encode;
pub mod error;
pub mod hamiltonian;
pub mod synthesis;

pub use bits::int_to_bits;
pub use block_encode::{BlockEncoder, EncodingScheme, Register};
pub use error::{EncodeError, EncodeResult};
pub use hamiltonian::{Hamiltonian, PauliOp, PauliString, Selection};
pub use synthesis::append_pauli_string;
