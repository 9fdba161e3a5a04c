//! Hamiltonian data structures.
//!
//! A Hamiltonian is a linear combination of unitaries, each a Pauli string:
//!
//!   H = Σ_i  c_i · P_i
//!
//! where every P_i is a tensor product of single-qubit Pauli operators over
//! the same number of qubits and c_i ∈ ℝ. Character 0 of a Pauli string acts
//! on the most significant qubit.
//!
//! # Example
//!
//! ```rust
//! use qbm_encode::Hamiltonian;
//!
//! // Transverse-field Ising chain, J = 1, g = 0.5.
//! let h = Hamiltonian::new(
//!     &["XXI", "IXX", "ZII", "IZI", "IIZ"],
//!     vec![-1.0, -1.0, -0.5, -0.5, -0.5],
//! )
//! .unwrap();
//! assert_eq!(h.n_qubits(), 3);
//! assert_eq!(h.n_params(), 5);
//! assert!((h.norm() - 3.5).abs() < 1e-12);
//! ```

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use ndarray::linalg::kron;
use num_complex::Complex64;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EncodeError, EncodeResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauliOp {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl PauliOp {
    /// Parse a single character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PauliOp::I),
            'X' => Some(PauliOp::X),
            'Y' => Some(PauliOp::Y),
            'Z' => Some(PauliOp::Z),
            _ => None,
        }
    }

    /// The character for this operator.
    pub fn as_char(self) -> char {
        match self {
            PauliOp::I => 'I',
            PauliOp::X => 'X',
            PauliOp::Y => 'Y',
            PauliOp::Z => 'Z',
        }
    }

    /// The 2×2 matrix of this operator.
    pub fn matrix(self) -> Array2<Complex64> {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let entries = match self {
            PauliOp::I => [[l, o], [o, l]],
            PauliOp::X => [[o, l], [l, o]],
            PauliOp::Y => [[o, -i], [i, o]],
            PauliOp::Z => [[l, o], [o, -l]],
        };
        ndarray::arr2(&entries)
    }
}

/// A tensor product of Pauli operators, one per qubit.
///
/// Unlike a sparse representation the identity factors are kept, so the
/// string's length is the number of qubits it acts on. Serialises as text,
/// e.g. `"XIZ"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PauliString {
    ops: Vec<PauliOp>,
}

impl PauliString {
    /// Construct from a sequence of operators.
    pub fn from_ops(ops: impl IntoIterator<Item = PauliOp>) -> EncodeResult<Self> {
        let ops: Vec<PauliOp> = ops.into_iter().collect();
        if ops.is_empty() {
            return Err(EncodeError::EmptyTerm);
        }
        Ok(Self { ops })
    }

    /// The all-identity string on `n` qubits.
    pub fn identity(n: usize) -> EncodeResult<Self> {
        Self::from_ops(std::iter::repeat_n(PauliOp::I, n))
    }

    /// The operators, most significant qubit first.
    pub fn ops(&self) -> &[PauliOp] {
        &self.ops
    }

    /// Number of qubits the string acts on.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Always `false`; a valid string acts on at least one qubit.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// True if every factor is the identity.
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| *op == PauliOp::I)
    }

    /// Dense `2^L × 2^L` matrix, character 0 as the outermost Kronecker factor.
    pub fn matrix(&self) -> Array2<Complex64> {
        self.ops
            .iter()
            .rev()
            .fold(Array2::eye(1), |acc, op| kron(&op.matrix(), &acc))
    }
}

impl FromStr for PauliString {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ops = s
            .chars()
            .map(|c| {
                PauliOp::from_char(c).ok_or_else(|| EncodeError::InvalidPauliChar {
                    character: c,
                    term: s.to_string(),
                })
            })
            .collect::<EncodeResult<Vec<_>>>()?;
        Self::from_ops(ops)
    }
}

impl TryFrom<String> for PauliString {
    type Error = EncodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PauliString> for String {
    fn from(p: PauliString) -> Self {
        p.to_string()
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            write!(f, "{}", op.as_char())?;
        }
        Ok(())
    }
}

/// Which part of a Hamiltonian to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// The coefficient-weighted sum of all terms.
    #[default]
    All,
    /// A single, unweighted term.
    Term(usize),
}

impl From<usize> for Selection {
    fn from(index: usize) -> Self {
        Selection::Term(index)
    }
}

/// Wire form of a Hamiltonian, validated on deserialisation.
#[derive(Deserialize)]
struct RawHamiltonian {
    terms: Vec<PauliString>,
    coefficients: Vec<f64>,
}

/// A weighted sum of equal-length Pauli strings.
///
/// Immutable once built; every constructor validates that terms and
/// coefficients pair up, that all strings share one length, and that every
/// coefficient is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hamiltonian {
    terms: Vec<PauliString>,
    coefficients: Vec<f64>,
    #[serde(skip)]
    n_qubits: usize,
}

impl Hamiltonian {
    /// Parse and validate `terms`, pairing them positionally with
    /// `coefficients`.
    pub fn new<S: AsRef<str>>(terms: &[S], coefficients: Vec<f64>) -> EncodeResult<Self> {
        if terms.len() != coefficients.len() {
            return Err(EncodeError::LengthMismatch {
                terms: terms.len(),
                coefficients: coefficients.len(),
            });
        }
        let terms = terms
            .iter()
            .map(|t| t.as_ref().parse())
            .collect::<EncodeResult<Vec<PauliString>>>()?;
        Self::from_pauli_strings(terms, coefficients)
    }

    /// Validate already-parsed Pauli strings.
    pub fn from_pauli_strings(
        terms: Vec<PauliString>,
        coefficients: Vec<f64>,
    ) -> EncodeResult<Self> {
        if terms.len() != coefficients.len() {
            return Err(EncodeError::LengthMismatch {
                terms: terms.len(),
                coefficients: coefficients.len(),
            });
        }
        let n_qubits = terms
            .first()
            .map(PauliString::len)
            .ok_or(EncodeError::EmptyHamiltonian)?;

        for (index, term) in terms.iter().enumerate() {
            if term.len() != n_qubits {
                return Err(EncodeError::NonUniformTerm {
                    index,
                    expected: n_qubits,
                    got: term.len(),
                });
            }
        }
        if let Some((index, &value)) = coefficients.iter().enumerate().find(|(_, c)| !c.is_finite())
        {
            return Err(EncodeError::NonFiniteCoefficient { index, value });
        }

        Ok(Self {
            terms,
            coefficients,
            n_qubits,
        })
    }

    /// Open-chain transverse-field Ising model on `n` qubits:
    ///
    ///   H = -J Σ_i X_i X_{i+1}  -  g Σ_i Z_i
    ///
    /// Coupling terms come first, then the field terms, each in qubit order.
    pub fn transverse_field_ising(n: usize, coupling: f64, field: f64) -> EncodeResult<Self> {
        let mut terms = Vec::with_capacity(2 * n);
        let mut coefficients = Vec::with_capacity(2 * n);

        for i in 0..n.saturating_sub(1) {
            let mut ops = vec![PauliOp::I; n];
            ops[i] = PauliOp::X;
            ops[i + 1] = PauliOp::X;
            terms.push(PauliString::from_ops(ops)?);
            coefficients.push(-coupling);
        }
        for i in 0..n {
            let mut ops = vec![PauliOp::I; n];
            ops[i] = PauliOp::Z;
            terms.push(PauliString::from_ops(ops)?);
            coefficients.push(-field);
        }

        Self::from_pauli_strings(terms, coefficients)
    }

    /// The Pauli strings, in input order.
    pub fn terms(&self) -> &[PauliString] {
        &self.terms
    }

    /// The coefficients, parallel to [`Hamiltonian::terms`].
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Length of every Pauli string.
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Number of terms.
    pub fn n_params(&self) -> usize {
        self.terms.len()
    }

    /// L1 norm of the coefficients, Σ |c_i|.
    pub fn norm(&self) -> f64 {
        self.coefficients.iter().map(|c| c.abs()).sum()
    }

    /// Shift and rescale the spectrum into `[δ, 1]`.
    ///
    /// Returns the original terms followed by an all-identity term. The
    /// original coefficients are scaled by `(1-δ)/(2·norm)` and the identity
    /// gets `(1+δ)/2`. `self` is left untouched.
    pub fn preprocessing(&self, delta: f64) -> EncodeResult<(Vec<PauliString>, Vec<f64>)> {
        if delta.is_nan() || delta >= 1.0 {
            return Err(EncodeError::InvalidDelta(delta));
        }
        let norm = self.norm();
        if norm == 0.0 {
            return Err(EncodeError::ZeroNorm);
        }

        let scale = (1.0 - delta) / (2.0 * norm);
        let mut terms = self.terms.clone();
        terms.push(PauliString::identity(self.n_qubits)?);
        let mut coefficients: Vec<f64> = self.coefficients.iter().map(|c| c * scale).collect();
        coefficients.push((1.0 + delta) / 2.0);
        Ok((terms, coefficients))
    }

    /// [`Hamiltonian::preprocessing`] packaged as a new Hamiltonian.
    pub fn preprocessed(&self, delta: f64) -> EncodeResult<Self> {
        let (terms, coefficients) = self.preprocessing(delta)?;
        Self::from_pauli_strings(terms, coefficients)
    }

    /// Dense matrix of one term, or of the weighted sum.
    pub fn assemble(&self, selection: impl Into<Selection>) -> EncodeResult<Array2<Complex64>> {
        match selection.into() {
            Selection::Term(index) => self
                .terms
                .get(index)
                .map(PauliString::matrix)
                .ok_or(EncodeError::TermOutOfRange {
                    index,
                    n_params: self.n_params(),
                }),
            Selection::All => {
                let dim = 1usize << self.n_qubits;
                let sum = self.terms.iter().zip(&self.coefficients).fold(
                    Array2::<Complex64>::zeros((dim, dim)),
                    |mut acc, (term, &c)| {
                        acc.scaled_add(Complex64::new(c, 0.0), &term.matrix());
                        acc
                    },
                );
                Ok(sum)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Hamiltonian {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawHamiltonian::deserialize(deserializer)?;
        Self::from_pauli_strings(raw.terms, raw.coefficients).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Hamiltonian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (term, c)) in self.terms.iter().zip(&self.coefficients).enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{c} * {term}")?;
        }
        Ok(())
    }
}
