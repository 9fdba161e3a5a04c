//! Statevector simulation engine.
//!
//! Wires are addressed by position in an ordered wire list. Position 0 is the
//! most significant bit of the basis index, matching the big-endian
//! convention of the circuit IR.

use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;
use rustc_hash::FxHashMap;

use qbm_ir::{GateKind, Instruction, QubitId, StandardGate};

use crate::error::{SimError, SimResult};
use crate::linalg;

/// Largest register the dense simulator accepts.
pub const MAX_QUBITS: usize = 20;

/// Mapping from circuit qubits to statevector positions.
pub type Layout = FxHashMap<QubitId, usize>;

/// Build a layout from an ordered wire list.
pub fn layout(wires: &[QubitId]) -> SimResult<Layout> {
    let mut map = Layout::default();
    for (position, &qubit) in wires.iter().enumerate() {
        if map.insert(qubit, position).is_some() {
            return Err(SimError::DuplicateWire(qubit));
        }
    }
    Ok(map)
}

/// The unitary a block-encoding instruction acts with; `None` for any other
/// gate.
pub(crate) fn block_unitary(instruction: &Instruction) -> SimResult<Option<Array2<Complex64>>> {
    let GateKind::BlockEncode(encoding) = &instruction.gate.kind else {
        return Ok(None);
    };
    let a = Array2::from_shape_vec((encoding.dim(), encoding.dim()), encoding.matrix().to_vec())
        .map_err(|e| SimError::InvalidDilation(e.to_string()))?;
    let u = linalg::dilation(&a, encoding.num_qubits())?;
    Ok(Some(if instruction.gate.adjoint {
        linalg::adjoint(&u)
    } else {
        u
    }))
}

/// A statevector representing a quantum state.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> SimResult<Self> {
        Self::basis(num_qubits, 0)
    }

    /// Create the computational basis state `|index⟩`.
    pub fn basis(num_qubits: usize, index: usize) -> SimResult<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(SimError::TooManyQubits {
                requested: num_qubits,
                max: MAX_QUBITS,
            });
        }
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[index % size] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The state amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Squared norm of the state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Multiply every amplitude by `exp(iφ)`.
    pub fn apply_global_phase(&mut self, phi: f64) {
        if phi == 0.0 {
            return;
        }
        let phase = Complex64::from_polar(1.0, phi);
        for amp in &mut self.amplitudes {
            *amp *= phase;
        }
    }

    /// Apply an instruction, resolving its qubits through `layout`.
    pub fn apply(&mut self, instruction: &Instruction, layout: &Layout) -> SimResult<()> {
        let dilated = block_unitary(instruction)?;
        self.apply_with(instruction, dilated.as_ref(), layout)
    }

    /// Apply an instruction whose block-encoding unitary, if any, was built
    /// ahead of time by [`block_unitary`].
    pub(crate) fn apply_with(
        &mut self,
        instruction: &Instruction,
        dilated: Option<&Array2<Complex64>>,
        layout: &Layout,
    ) -> SimResult<()> {
        let position = |q: &QubitId| layout.get(q).copied().ok_or(SimError::UnmappedQubit(*q));
        let controls = instruction
            .controls
            .iter()
            .map(position)
            .collect::<SimResult<Vec<_>>>()?;
        let targets = instruction
            .qubits
            .iter()
            .map(position)
            .collect::<SimResult<Vec<_>>>()?;
        let (ctrl_mask, ctrl_value) = self.control_pattern(&controls, &instruction.control_values);

        match &instruction.gate.kind {
            GateKind::Standard(gate) => {
                self.apply_standard_gate(gate, &targets, ctrl_mask, ctrl_value);
            }
            GateKind::StatePrep(prep) => {
                for op in prep.decompose(&instruction.qubits, instruction.gate.adjoint)? {
                    let op = op.controlled(&instruction.controls, &instruction.control_values)?;
                    self.apply(&op, layout)?;
                }
            }
            GateKind::BlockEncode(_) => {
                let u = dilated.ok_or_else(|| {
                    SimError::InvalidDilation("no unitary built for block encoding".into())
                })?;
                self.apply_matrix(u, &targets, ctrl_mask, ctrl_value);
            }
        }
        Ok(())
    }

    fn mask(&self, position: usize) -> usize {
        1 << (self.num_qubits - 1 - position)
    }

    fn control_pattern(&self, controls: &[usize], values: &[bool]) -> (usize, usize) {
        controls
            .iter()
            .zip(values)
            .fold((0, 0), |(mask, value), (&c, &v)| {
                let bit = self.mask(c);
                (mask | bit, if v { value | bit } else { value })
            })
    }

    fn apply_standard_gate(
        &mut self,
        gate: &StandardGate,
        targets: &[usize],
        ctrl_mask: usize,
        ctrl_value: usize,
    ) {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i_val = Complex64::new(0.0, 1.0);
        let matrix = match gate {
            StandardGate::X => [[zero, one], [one, zero]],
            StandardGate::Y => [[zero, -i_val], [i_val, zero]],
            StandardGate::Z => [[one, zero], [zero, -one]],
            StandardGate::Ry(theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new((theta / 2.0).sin(), 0.0);
                [[c, -s], [s, c]]
            }
            StandardGate::GlobalPhase(phi) => {
                self.apply_phase(*phi, ctrl_mask, ctrl_value);
                return;
            }
        };
        self.apply_single(&matrix, targets[0], ctrl_mask, ctrl_value);
    }

    // =========================================================================
    // Kernels
    // =========================================================================

    fn apply_single(
        &mut self,
        m: &[[Complex64; 2]; 2],
        target: usize,
        ctrl_mask: usize,
        ctrl_value: usize,
    ) {
        let tgt_mask = self.mask(target);
        for i in 0..self.amplitudes.len() {
            if (i & tgt_mask == 0) && (i & ctrl_mask == ctrl_value) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_phase(&mut self, phi: f64, ctrl_mask: usize, ctrl_value: usize) {
        let phase = Complex64::from_polar(1.0, phi);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & ctrl_mask == ctrl_value {
                *amp *= phase;
            }
        }
    }

    /// Apply a `2^k × 2^k` unitary to `targets`, the first target being the
    /// most significant bit of the matrix index.
    fn apply_matrix(
        &mut self,
        u: &Array2<Complex64>,
        targets: &[usize],
        ctrl_mask: usize,
        ctrl_value: usize,
    ) {
        let k = targets.len();
        let masks: Vec<usize> = targets.iter().map(|&t| self.mask(t)).collect();
        let target_mask = masks.iter().fold(0, |acc, m| acc | m);
        let offsets: Vec<usize> = (0..1usize << k)
            .map(|t| {
                (0..k)
                    .filter(|b| (t >> (k - 1 - b)) & 1 == 1)
                    .fold(0, |acc, b| acc | masks[b])
            })
            .collect();

        let mut buffer = vec![Complex64::new(0.0, 0.0); offsets.len()];
        for base in 0..self.amplitudes.len() {
            if (base & target_mask != 0) || (base & ctrl_mask != ctrl_value) {
                continue;
            }
            for (slot, off) in buffer.iter_mut().zip(&offsets) {
                *slot = self.amplitudes[base | off];
            }
            for (row, off) in offsets.iter().enumerate() {
                self.amplitudes[base | off] = buffer
                    .iter()
                    .enumerate()
                    .map(|(col, amp)| u[[row, col]] * amp)
                    .sum();
            }
        }
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Sample a basis index from the Born distribution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave the cumulative sum just below one.
        self.amplitudes.len() - 1
    }

    /// Sample `shots` basis indices and tally them.
    pub fn sample_counts<R: Rng + ?Sized>(&self, shots: usize, rng: &mut R) -> FxHashMap<usize, u64> {
        let mut counts = FxHashMap::default();
        for _ in 0..shots {
            *counts.entry(self.sample(rng)).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbm_ir::Circuit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    fn run(circuit: &Circuit) -> Statevector {
        let wires: Vec<QubitId> = circuit.qubits().iter().map(|q| q.id).collect();
        let layout = layout(&wires).unwrap();
        let mut sv = Statevector::new(wires.len()).unwrap();
        for inst in circuit.instructions() {
            sv.apply(inst, &layout).unwrap();
        }
        sv.apply_global_phase(circuit.phase());
        sv
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2).unwrap();
        assert!((sv.amplitudes()[0].re - 1.0).abs() < 1e-10);
        assert!((sv.norm_sqr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_wire_is_most_significant() {
        let mut circuit = Circuit::with_size("msb", 2);
        circuit.x(QubitId(0)).unwrap();
        let sv = run(&circuit);
        assert!((sv.amplitudes()[0b10].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_controlled_gate() {
        let mut circuit = Circuit::with_size("ctrl0", 2);
        circuit
            .controlled(&[QubitId(0)], &[false], |c| {
                c.x(QubitId(1))?;
                Ok(())
            })
            .unwrap();
        let sv = run(&circuit);
        assert!((sv.amplitudes()[0b01].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_y_gate_phases() {
        let mut circuit = Circuit::with_size("y", 1);
        circuit.y(QubitId(0)).unwrap();
        let sv = run(&circuit);
        assert!((sv.amplitudes()[1] - Complex64::new(0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_controlled_phase_is_relative() {
        let mut circuit = Circuit::with_size("phase", 1);
        circuit.ry(PI / 2.0, QubitId(0)).unwrap();
        circuit
            .controlled(&[QubitId(0)], &[true], |c| {
                c.global_phase(PI);
                Ok(())
            })
            .unwrap();
        let sv = run(&circuit);
        let h = 0.5f64.sqrt();
        assert!((sv.amplitudes()[0].re - h).abs() < 1e-12);
        assert!((sv.amplitudes()[1].re + h).abs() < 1e-12);
    }

    #[test]
    fn test_state_prep_amplitudes() {
        let amps = [0.1, 0.7, 0.5, 0.5];
        let mut circuit = Circuit::with_size("prep", 2);
        circuit.state_prep(&amps, &[QubitId(0), QubitId(1)]).unwrap();
        let sv = run(&circuit);
        for (got, want) in sv.amplitudes().iter().zip(amps) {
            assert!((got.re - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_state_prep_then_adjoint_is_identity() {
        let amps = [0.6, 0.0, 0.0, 0.8];
        let wires = [QubitId(0), QubitId(1)];
        let mut circuit = Circuit::with_size("prep", 2);
        circuit
            .state_prep(&amps, &wires)
            .unwrap()
            .state_prep_dg(&amps, &wires)
            .unwrap();
        let sv = run(&circuit);
        assert!((sv.amplitudes()[0].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unmapped_qubit() {
        let mut circuit = Circuit::with_size("wide", 2);
        circuit.x(QubitId(1)).unwrap();
        let layout = layout(&[QubitId(0)]).unwrap();
        let mut sv = Statevector::new(1).unwrap();
        let inst = circuit.instructions().next().unwrap();
        assert!(matches!(
            sv.apply(inst, &layout),
            Err(SimError::UnmappedQubit(QubitId(1)))
        ));
    }

    #[test]
    fn test_too_many_qubits() {
        assert!(matches!(
            Statevector::new(MAX_QUBITS + 1),
            Err(SimError::TooManyQubits { .. })
        ));
    }

    #[test]
    fn test_sample_deterministic() {
        // |1⟩ state should always sample to 1
        let mut circuit = Circuit::with_size("one", 1);
        circuit.x(QubitId(0)).unwrap();
        let sv = run(&circuit);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            assert_eq!(sv.sample(&mut rng), 1);
        }
    }

    #[test]
    fn test_sample_counts_follow_amplitudes() {
        let mut circuit = Circuit::with_size("prep", 1);
        circuit.state_prep(&[0.6, 0.8], &[QubitId(0)]).unwrap();
        let sv = run(&circuit);
        let mut rng = StdRng::seed_from_u64(42);
        let counts = sv.sample_counts(10_000, &mut rng);
        let ones = counts.get(&1).copied().unwrap_or(0) as f64 / 10_000.0;
        assert!((ones - 0.64).abs() < 0.03);
    }
}
