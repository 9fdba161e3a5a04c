//! Quantum gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Absolute tolerance on the squared norm of a state-preparation vector.
const NORM_TOLERANCE: f64 = 1e-9;

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Rotation around Y axis.
    Ry(f64),
    /// Phase factor `exp(iφ)` on the whole state.
    ///
    /// Acts on no target qubits. Uncontrolled it only shifts the circuit's
    /// global phase; controlled it becomes a relative phase on the subspace
    /// selected by the control pattern.
    GlobalPhase(f64),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::Ry(_) => "ry",
            StandardGate::GlobalPhase(_) => "gphase",
        }
    }

    /// Get the number of target qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::X | StandardGate::Y | StandardGate::Z | StandardGate::Ry(_) => 1,
            StandardGate::GlobalPhase(_) => 0,
        }
    }

    /// The inverse gate.
    pub fn inverse(&self) -> Self {
        match self {
            StandardGate::X | StandardGate::Y | StandardGate::Z => self.clone(),
            StandardGate::Ry(theta) => StandardGate::Ry(-theta),
            StandardGate::GlobalPhase(phi) => StandardGate::GlobalPhase(-phi),
        }
    }
}

/// Amplitude state preparation: drives `|0…0⟩` to `Σ_i a_i |i⟩`.
///
/// Amplitudes are non-negative reals, zero-padded to `2^num_qubits` entries
/// and normalised to one. Basis index `i` is big-endian over the target wires:
/// the first wire carries the most significant bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePreparation {
    amplitudes: Vec<f64>,
    num_qubits: u32,
}

impl StatePreparation {
    /// Validate and pad an amplitude vector for a register of `num_qubits`.
    pub fn new(amplitudes: &[f64], num_qubits: u32) -> IrResult<Self> {
        let dim = 1usize
            .checked_shl(num_qubits)
            .ok_or_else(|| IrError::InvalidAmplitudes(format!("{num_qubits} qubits is too wide")))?;
        if amplitudes.len() > dim {
            return Err(IrError::InvalidAmplitudes(format!(
                "{} amplitudes do not fit in {num_qubits} qubits",
                amplitudes.len()
            )));
        }
        if let Some(bad) = amplitudes.iter().find(|a| !a.is_finite() || **a < 0.0) {
            return Err(IrError::InvalidAmplitudes(format!(
                "amplitude {bad} is not a non-negative real"
            )));
        }
        let norm_sq: f64 = amplitudes.iter().map(|a| a * a).sum();
        if (norm_sq - 1.0).abs() > NORM_TOLERANCE {
            return Err(IrError::InvalidAmplitudes(format!(
                "squared norm is {norm_sq}, expected 1"
            )));
        }

        let mut padded = amplitudes.to_vec();
        padded.resize(dim, 0.0);
        Ok(Self {
            amplitudes: padded,
            num_qubits,
        })
    }

    /// The zero-padded amplitude vector.
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Lower the preparation onto `wires` as a tree of multi-controlled RY
    /// rotations.
    ///
    /// Level `k` rotates wire `k` conditioned on every bit pattern of the
    /// first `k` wires, splitting each subtree's weight between its halves.
    /// With `adjoint` set the sequence is reversed and every angle negated.
    pub fn decompose(&self, wires: &[QubitId], adjoint: bool) -> IrResult<Vec<Instruction>> {
        if wires.len() != self.num_qubits as usize {
            return Err(IrError::QubitCountMismatch {
                gate_name: "state_prep".into(),
                expected: self.num_qubits,
                got: wires.len() as u32,
            });
        }

        let mut ops = Vec::new();
        for (level, angles) in self.rotation_tree().into_iter().enumerate() {
            for (prefix, theta) in angles.into_iter().enumerate() {
                if theta == 0.0 {
                    continue;
                }
                let values: Vec<bool> = (0..level)
                    .map(|k| (prefix >> (level - 1 - k)) & 1 == 1)
                    .collect();
                let op = Instruction::single_qubit_gate(StandardGate::Ry(theta), wires[level])
                    .controlled(&wires[..level], &values)?;
                ops.push(op);
            }
        }

        if adjoint {
            ops.reverse();
            for op in &mut ops {
                op.gate = op.gate.dagger();
            }
        }
        Ok(ops)
    }

    /// RY angles per level, indexed by the control prefix.
    fn rotation_tree(&self) -> Vec<Vec<f64>> {
        let n = self.num_qubits as usize;
        let weights: Vec<f64> = self.amplitudes.iter().map(|a| a * a).collect();

        (0..n)
            .map(|level| {
                let span = 1usize << (n - level);
                let half = span / 2;
                (0..1usize << level)
                    .map(|prefix| {
                        let start = prefix * span;
                        let low: f64 = weights[start..start + half].iter().sum();
                        let high: f64 = weights[start + half..start + span].iter().sum();
                        let total = low + high;
                        if total <= 0.0 {
                            0.0
                        } else {
                            2.0 * (low / total).sqrt().clamp(0.0, 1.0).acos()
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Embeds a square matrix `A` with `‖A‖ ≤ 1` as the leading block of a unitary.
///
/// The gate acts on `num_qubits` wires, the first of which selects the block;
/// `A` is zero-padded to `2^(num_qubits-1)` rows when smaller. The matrix is
/// stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEncoding {
    matrix: Vec<Complex64>,
    dim: usize,
    num_qubits: u32,
}

impl BlockEncoding {
    /// Create a block-encoding gate for a row-major `dim × dim` matrix.
    ///
    /// Contractivity is the caller's contract and is not checked here.
    pub fn new(matrix: Vec<Complex64>, dim: usize, num_qubits: u32) -> IrResult<Self> {
        if dim == 0 || matrix.len() != dim * dim {
            return Err(IrError::InvalidMatrix(format!(
                "{} entries do not form a {dim}x{dim} matrix",
                matrix.len()
            )));
        }
        let capacity = match num_qubits.checked_sub(1).and_then(|n| 1usize.checked_shl(n)) {
            Some(c) => c,
            None => {
                return Err(IrError::InvalidMatrix(format!(
                    "cannot embed into {num_qubits} qubits"
                )));
            }
        };
        if dim > capacity {
            return Err(IrError::InvalidMatrix(format!(
                "{dim}x{dim} matrix needs more than {num_qubits} qubits"
            )));
        }
        if matrix.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
            return Err(IrError::InvalidMatrix("matrix has non-finite entries".into()));
        }
        Ok(Self {
            matrix,
            dim,
            num_qubits,
        })
    }

    /// Row-major matrix entries.
    pub fn matrix(&self) -> &[Complex64] {
        &self.matrix
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Entry at `(row, col)`.
    pub fn element(&self, row: usize, col: usize) -> Complex64 {
        self.matrix[row * self.dim + col]
    }

    /// Number of wires the gate spans.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }
}

/// The operation a gate performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateKind {
    /// A standard gate with known semantics.
    Standard(StandardGate),
    /// Amplitude state preparation.
    StatePrep(StatePreparation),
    /// Matrix block encoding.
    BlockEncode(BlockEncoding),
}

impl GateKind {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::Standard(g) => g.name(),
            GateKind::StatePrep(_) => "state_prep",
            GateKind::BlockEncode(_) => "block_encode",
        }
    }

    /// Get the number of target qubits.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            GateKind::Standard(g) => g.num_qubits(),
            GateKind::StatePrep(g) => g.num_qubits(),
            GateKind::BlockEncode(g) => g.num_qubits(),
        }
    }
}

/// A gate with associated metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether the conjugate transpose of `kind` is applied.
    #[serde(default)]
    pub adjoint: bool,
}

impl Gate {
    /// Create a new gate from a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self::from_kind(GateKind::Standard(gate))
    }

    /// Create a state-preparation gate.
    pub fn state_prep(prep: StatePreparation) -> Self {
        Self::from_kind(GateKind::StatePrep(prep))
    }

    /// Create a block-encoding gate.
    pub fn block_encode(encoding: BlockEncoding) -> Self {
        Self::from_kind(GateKind::BlockEncode(encoding))
    }

    fn from_kind(kind: GateKind) -> Self {
        Self {
            kind,
            label: None,
            adjoint: false,
        }
    }

    /// Add a label to the gate.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The inverse gate. Standard gates are inverted in place; composite
    /// gates toggle their adjoint flag.
    #[must_use]
    pub fn dagger(&self) -> Self {
        let mut inverse = self.clone();
        match &self.kind {
            GateKind::Standard(g) => inverse.kind = GateKind::Standard(g.inverse()),
            GateKind::StatePrep(_) | GateKind::BlockEncode(_) => inverse.adjoint = !self.adjoint,
        }
        inverse
    }

    /// Get the name of this gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Get the number of target qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}
