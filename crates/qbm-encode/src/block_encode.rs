//! Unitary block encodings of LCU Hamiltonians.
//!
//! A block encoding of `H` is a unitary `U` on `enc ⊗ sys` with
//!
//!   (⟨0|_enc ⊗ I_sys) U (|0⟩_enc ⊗ I_sys) = H / α
//!
//! where α is the subnormalisation, here the L1 norm of the coefficients.
//! Two schemes are provided:
//!
//! - **General**: a single `block_encode` gate carrying `H / α` directly,
//!   using one encoding qubit.
//! - **LCU**: PREPARE · SELECT · PREPARE†. PREPARE loads
//!   `Σ_i sqrt(|c_i| / α) |i⟩` on ⌈log2(n_params)⌉ encoding qubits; SELECT
//!   applies `sign(c_i) · P_i` to the system register controlled on the
//!   encoding register holding `i`.
//!
//! # Example
//!
//! ```rust
//! use qbm_encode::{BlockEncoder, EncodingScheme, Register};
//!
//! let encoder = BlockEncoder::new(&["X", "Z"], vec![1.0, -1.0], EncodingScheme::Lcu).unwrap();
//! assert_eq!(encoder.n_qubits(&[Register::Encoding]), 1);
//!
//! let circuit = encoder.build_circuit().unwrap();
//! assert_eq!(circuit.num_qubits(), 2);
//! ```

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use qbm_ir::{Circuit, QubitId};

use crate::bits::int_to_bits;
use crate::error::{EncodeError, EncodeResult};
use crate::hamiltonian::{Hamiltonian, Selection};
use crate::synthesis::emit_pauli_ops;

/// Block-encoding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingScheme {
    /// Direct embedding of the normalised matrix.
    General,
    /// PREPARE / SELECT / PREPARE† over the Pauli terms.
    Lcu,
}

impl FromStr for EncodingScheme {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(EncodingScheme::General),
            "lcu" => Ok(EncodingScheme::Lcu),
            _ => Err(EncodeError::UnknownScheme(s.to_string())),
        }
    }
}

impl fmt::Display for EncodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingScheme::General => write!(f, "general"),
            EncodingScheme::Lcu => write!(f, "lcu"),
        }
    }
}

/// One of the two logical registers of a block encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Register {
    /// Ancilla register whose `|0…0⟩` projection selects the block.
    Encoding,
    /// Register the Hamiltonian acts on.
    System,
}

impl Register {
    /// Both registers, encoding first.
    pub const ALL: [Register; 2] = [Register::Encoding, Register::System];

    /// Register name used when allocating circuit qubits.
    pub fn qreg_name(self) -> &'static str {
        match self {
            Register::Encoding => "enc",
            Register::System => "sys",
        }
    }
}

impl FromStr for Register {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enc" | "encoding" => Ok(Register::Encoding),
            "sys" | "system" => Ok(Register::System),
            _ => Err(EncodeError::UnknownRegister(s.to_string())),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Encoding => write!(f, "Encoding"),
            Register::System => write!(f, "System"),
        }
    }
}

/// Scheme-specific state computed once at construction.
#[derive(Debug, Clone, PartialEq)]
enum Payload {
    General { matrix: Array2<Complex64> },
    Lcu { amplitudes: Vec<f64> },
}

/// Block encoder for an LCU Hamiltonian.
///
/// Immutable after construction; emission only reads the stored payload and
/// the wire lists it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEncoder {
    scheme: EncodingScheme,
    hamiltonian: Hamiltonian,
    norm: f64,
    payload: Payload,
}

impl BlockEncoder {
    /// Build the Hamiltonian from `terms` / `coefficients` and precompute the
    /// scheme's payload.
    pub fn new<S: AsRef<str>>(
        terms: &[S],
        coefficients: Vec<f64>,
        scheme: EncodingScheme,
    ) -> EncodeResult<Self> {
        Self::from_hamiltonian(Hamiltonian::new(terms, coefficients)?, scheme)
    }

    /// Precompute the scheme's payload for an existing Hamiltonian.
    pub fn from_hamiltonian(hamiltonian: Hamiltonian, scheme: EncodingScheme) -> EncodeResult<Self> {
        let norm = hamiltonian.norm();
        if norm == 0.0 {
            return Err(EncodeError::ZeroNorm);
        }

        let payload = match scheme {
            EncodingScheme::General => {
                let matrix = hamiltonian.assemble(Selection::All)?.mapv(|z| z / norm);
                Payload::General { matrix }
            }
            EncodingScheme::Lcu => {
                let amplitudes = hamiltonian
                    .coefficients()
                    .iter()
                    .map(|c| (c.abs() / norm).sqrt())
                    .collect();
                Payload::Lcu { amplitudes }
            }
        };

        debug!(
            scheme = %scheme,
            n_params = hamiltonian.n_params(),
            n_qubits = hamiltonian.n_qubits(),
            norm,
            "constructed block encoder"
        );

        Ok(Self {
            scheme,
            hamiltonian,
            norm,
            payload,
        })
    }

    /// The encoding scheme.
    pub fn scheme(&self) -> EncodingScheme {
        self.scheme
    }

    /// The encoded Hamiltonian.
    pub fn hamiltonian(&self) -> &Hamiltonian {
        &self.hamiltonian
    }

    /// The factor α with leading block `H / α`.
    pub fn subnormalization(&self) -> f64 {
        self.norm
    }

    /// PREPARE amplitudes, for the LCU scheme.
    pub fn amplitudes(&self) -> Option<&[f64]> {
        match &self.payload {
            Payload::Lcu { amplitudes } => Some(amplitudes),
            Payload::General { .. } => None,
        }
    }

    /// The normalised matrix `H / α`, for the general scheme.
    pub fn matrix(&self) -> Option<&Array2<Complex64>> {
        match &self.payload {
            Payload::General { matrix } => Some(matrix),
            Payload::Lcu { .. } => None,
        }
    }

    /// Width of a single register.
    pub fn register_width(&self, register: Register) -> usize {
        match (register, &self.payload) {
            (Register::System, _) => self.hamiltonian.n_qubits(),
            (Register::Encoding, Payload::General { .. }) => 1,
            (Register::Encoding, Payload::Lcu { amplitudes }) => {
                amplitudes.len().next_power_of_two().trailing_zeros() as usize
            }
        }
    }

    /// Total width of the listed registers; each register counts once.
    ///
    /// An empty list selects both registers.
    pub fn n_qubits(&self, registers: &[Register]) -> usize {
        let registers = if registers.is_empty() {
            &Register::ALL[..]
        } else {
            registers
        };
        Register::ALL
            .iter()
            .filter(|r| registers.contains(r))
            .map(|&r| self.register_width(r))
            .sum()
    }

    /// Width of both registers together.
    pub fn total_qubits(&self) -> usize {
        self.n_qubits(&Register::ALL)
    }

    /// Emit the block encoding onto `enc_wires` and `sys_wires`.
    ///
    /// Wire counts and disjointness are checked before anything is emitted,
    /// and the gates are staged so that `circuit` is unchanged on error.
    pub fn circuit(
        &self,
        circuit: &mut Circuit,
        enc_wires: &[QubitId],
        sys_wires: &[QubitId],
    ) -> EncodeResult<()> {
        for (register, wires) in [
            (Register::Encoding, enc_wires),
            (Register::System, sys_wires),
        ] {
            let expected = self.register_width(register);
            if wires.len() != expected {
                return Err(EncodeError::WireCountMismatch {
                    register,
                    expected,
                    got: wires.len(),
                });
            }
        }
        if let Some(&q) = enc_wires.iter().find(|q| sys_wires.contains(q)) {
            return Err(EncodeError::OverlappingWires(q));
        }

        let mut staged = circuit.fork();
        match &self.payload {
            Payload::General { matrix } => {
                let wires: Vec<QubitId> = enc_wires.iter().chain(sys_wires).copied().collect();
                staged.block_encode(matrix.iter().copied().collect(), matrix.nrows(), &wires)?;
            }
            Payload::Lcu { amplitudes } => {
                // PREPARE
                staged.state_prep(amplitudes, enc_wires)?;

                // SELECT
                let terms = self.hamiltonian.terms();
                let coefficients = self.hamiltonian.coefficients();
                for (i, (term, &c)) in terms.iter().zip(coefficients).enumerate() {
                    let pattern = int_to_bits(i, enc_wires.len());
                    staged.controlled(enc_wires, &pattern, |body| {
                        emit_pauli_ops(body, term.ops(), sys_wires, c < 0.0)
                    })?;
                }

                // PREPARE†
                staged.state_prep_dg(amplitudes, enc_wires)?;
            }
        }

        debug!(
            scheme = %self.scheme,
            n_enc = enc_wires.len(),
            n_sys = sys_wires.len(),
            n_ops = staged.num_ops(),
            "emitted block encoding"
        );
        circuit.append(staged)?;
        Ok(())
    }

    /// A fresh circuit with `enc` and `sys` registers holding the encoding.
    pub fn build_circuit(&self) -> EncodeResult<Circuit> {
        let mut circuit = Circuit::new(format!("block_encoding_{}", self.scheme));
        let enc = circuit.add_qreg(
            Register::Encoding.qreg_name(),
            self.register_width(Register::Encoding) as u32,
        );
        let sys = circuit.add_qreg(
            Register::System.qreg_name(),
            self.register_width(Register::System) as u32,
        );
        self.circuit(&mut circuit, &enc, &sys)?;
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbm_ir::GateKind;

    fn x_minus_z(scheme: EncodingScheme) -> BlockEncoder {
        BlockEncoder::new(&["X", "Z"], vec![1.0, -1.0], scheme).unwrap()
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("lcu".parse::<EncodingScheme>().unwrap(), EncodingScheme::Lcu);
        assert_eq!(
            "General".parse::<EncodingScheme>().unwrap(),
            EncodingScheme::General
        );
        assert!(matches!(
            "qrom".parse::<EncodingScheme>(),
            Err(EncodeError::UnknownScheme(_))
        ));
    }

    #[test]
    fn test_register_parsing() {
        assert_eq!("enc".parse::<Register>().unwrap(), Register::Encoding);
        assert_eq!("system".parse::<Register>().unwrap(), Register::System);
        assert!(matches!(
            "anc".parse::<Register>(),
            Err(EncodeError::UnknownRegister(_))
        ));
    }

    #[test]
    fn test_general_payload() {
        let enc = x_minus_z(EncodingScheme::General);
        assert!(enc.amplitudes().is_none());
        let m = enc.matrix().unwrap();
        // (X - Z) / 2
        assert_eq!(m[[0, 0]], Complex64::new(-0.5, 0.0));
        assert_eq!(m[[0, 1]], Complex64::new(0.5, 0.0));
        assert_eq!(m[[1, 1]], Complex64::new(0.5, 0.0));
        assert_eq!(enc.total_qubits(), 2);
    }

    #[test]
    fn test_lcu_payload() {
        let enc = x_minus_z(EncodingScheme::Lcu);
        assert!(enc.matrix().is_none());
        let h = 0.5f64.sqrt();
        for a in enc.amplitudes().unwrap() {
            assert!((a - h).abs() < 1e-15);
        }
        assert_eq!(enc.n_qubits(&[Register::Encoding]), 1);
        assert_eq!(enc.n_qubits(&[Register::System, Register::System]), 1);
    }

    #[test]
    fn test_zero_norm_rejected() {
        assert!(matches!(
            BlockEncoder::new(&["X"], vec![0.0], EncodingScheme::Lcu),
            Err(EncodeError::ZeroNorm)
        ));
    }

    #[test]
    fn test_select_layout() {
        let encoder = x_minus_z(EncodingScheme::Lcu);
        let circuit = encoder.build_circuit().unwrap();
        let ops: Vec<String> = circuit
            .instructions()
            .filter(|i| !matches!(i.gate.kind, GateKind::StatePrep(_)))
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            ops,
            vec!["ctrl(q0=0) x q1", "ctrl(q0=1) z q1", "ctrl(q0=1) gphase(3.141593)"]
        );
    }

    #[test]
    fn test_overlapping_wires() {
        let encoder = x_minus_z(EncodingScheme::General);
        let mut circuit = Circuit::with_size("c", 2);
        let result = encoder.circuit(&mut circuit, &[QubitId(0)], &[QubitId(0)]);
        assert!(matches!(result, Err(EncodeError::OverlappingWires(QubitId(0)))));
        assert_eq!(circuit.num_ops(), 0);
    }
}
