//! Whole-circuit simulation over an ordered wire list.

use ndarray::{Array2, s};
use num_complex::Complex64;
use tracing::debug;

use qbm_ir::{Circuit, Instruction, QubitId};

use crate::error::{SimError, SimResult};
use crate::statevector::{Layout, Statevector, block_unitary, layout};

fn checked_layout(circuit: &Circuit, wires: &[QubitId]) -> SimResult<Layout> {
    let layout = layout(wires)?;
    if let Some(q) = circuit
        .instructions()
        .flat_map(|inst| inst.wires())
        .find(|q| !layout.contains_key(q))
    {
        return Err(SimError::UnmappedQubit(q));
    }
    Ok(layout)
}

/// A circuit's instructions, each paired with its block-encoding unitary.
///
/// Dilations are built once here and shared by every state the program runs
/// on.
struct Program<'a> {
    ops: Vec<(&'a Instruction, Option<Array2<Complex64>>)>,
    phase: f64,
}

impl<'a> Program<'a> {
    fn new(circuit: &'a Circuit) -> SimResult<Self> {
        let ops = circuit
            .instructions()
            .map(|inst| Ok((inst, block_unitary(inst)?)))
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Self {
            ops,
            phase: circuit.phase(),
        })
    }

    fn evolve(&self, layout: &Layout, state: &mut Statevector) -> SimResult<()> {
        for (inst, dilated) in &self.ops {
            state.apply_with(inst, dilated.as_ref(), layout)?;
        }
        state.apply_global_phase(self.phase);
        Ok(())
    }
}

/// Run `circuit` on `|0…0⟩` over `wires` (first wire most significant).
pub fn run(circuit: &Circuit, wires: &[QubitId]) -> SimResult<Statevector> {
    let layout = checked_layout(circuit, wires)?;
    let program = Program::new(circuit)?;
    let mut state = Statevector::new(wires.len())?;
    program.evolve(&layout, &mut state)?;
    Ok(state)
}

/// Dense unitary of `circuit` restricted to `wires`.
///
/// Column `j` is the circuit applied to the basis state `|j⟩`, with the first
/// wire as the most significant bit.
pub fn circuit_unitary(circuit: &Circuit, wires: &[QubitId]) -> SimResult<Array2<Complex64>> {
    let layout = checked_layout(circuit, wires)?;
    let program = Program::new(circuit)?;
    let n = wires.len();
    debug!(n_qubits = n, n_ops = circuit.num_ops(), "building circuit unitary");

    let dim = Statevector::new(n)?.amplitudes().len();
    let mut unitary = Array2::<Complex64>::zeros((dim, dim));
    for col in 0..dim {
        let mut state = Statevector::basis(n, col)?;
        program.evolve(&layout, &mut state)?;
        for (row, amp) in state.amplitudes().iter().enumerate() {
            unitary[[row, col]] = *amp;
        }
    }
    Ok(unitary)
}

/// The top-left `dim × dim` block, i.e. the action on states whose leading
/// wires are all `|0⟩`.
pub fn leading_block(unitary: &Array2<Complex64>, dim: usize) -> Array2<Complex64> {
    unitary.slice(s![..dim, ..dim]).to_owned()
}
