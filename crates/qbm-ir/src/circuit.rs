//! High-level circuit builder API.

use num_complex::Complex64;
use tracing::trace;

use crate::dag::CircuitDag;
use crate::error::{IrError, IrResult};
use crate::gate::{BlockEncoding, Gate, StandardGate, StatePreparation};
use crate::instruction::Instruction;
use crate::qubit::{Qubit, QubitId};

/// A quantum circuit.
///
/// This provides a high-level API for building circuits out of the gates
/// the encoders emit, plus a [`Circuit::controlled`] combinator that lifts
/// a whole sub-circuit under a control pattern.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// The underlying DAG representation.
    dag: CircuitDag,
    /// Counter for generating qubit IDs.
    next_qubit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            dag: CircuitDag::new(),
            next_qubit_id: 0,
        }
    }

    /// Create a circuit with a given number of qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        circuit
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.qubits.push(Qubit::new(id));
        self.dag.add_qubit(id);
        id
    }

    /// Add a quantum register with multiple qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        let mut ids = vec![];
        for i in 0..size {
            let id = QubitId(self.next_qubit_id);
            self.next_qubit_id += 1;
            self.qubits.push(Qubit::with_register(id, &name, i));
            self.dag.add_qubit(id);
            ids.push(id);
        }
        ids
    }

    // =========================================================================
    // Standard gates
    // =========================================================================

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::X, qubit))?;
        Ok(self)
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::Y, qubit))?;
        Ok(self)
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::Z, qubit))?;
        Ok(self)
    }

    /// Apply RY rotation.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::Ry(theta), qubit))?;
        Ok(self)
    }

    /// Multiply the state by `exp(iφ)`.
    ///
    /// Outside a [`Circuit::controlled`] body this only shifts the circuit's
    /// global phase.
    pub fn global_phase(&mut self, phi: f64) -> &mut Self {
        self.dag.set_global_phase(self.dag.global_phase() + phi);
        self
    }

    // =========================================================================
    // Composite gates
    // =========================================================================

    /// Prepare `Σ_i a_i |i⟩` on `wires` (first wire most significant).
    ///
    /// The amplitudes are validated even when `wires` is empty; on zero wires
    /// the only valid vector is `[1.0]` and nothing is emitted.
    pub fn state_prep(&mut self, amplitudes: &[f64], wires: &[QubitId]) -> IrResult<&mut Self> {
        self.emit_state_prep(amplitudes, wires, false)
    }

    /// Apply the adjoint of [`Circuit::state_prep`].
    pub fn state_prep_dg(&mut self, amplitudes: &[f64], wires: &[QubitId]) -> IrResult<&mut Self> {
        self.emit_state_prep(amplitudes, wires, true)
    }

    fn emit_state_prep(
        &mut self,
        amplitudes: &[f64],
        wires: &[QubitId],
        adjoint: bool,
    ) -> IrResult<&mut Self> {
        let prep = StatePreparation::new(amplitudes, wires.len() as u32)?;
        if wires.is_empty() {
            return Ok(self);
        }
        let mut gate = Gate::state_prep(prep);
        if adjoint {
            gate = gate.dagger();
        }
        self.dag.apply(Instruction::gate(gate, wires.iter().copied()))?;
        Ok(self)
    }

    /// Embed the row-major `dim × dim` matrix as the leading block of a
    /// unitary acting on `wires`.
    pub fn block_encode(
        &mut self,
        matrix: Vec<Complex64>,
        dim: usize,
        wires: &[QubitId],
    ) -> IrResult<&mut Self> {
        let encoding = BlockEncoding::new(matrix, dim, wires.len() as u32)?;
        self.dag.apply(Instruction::gate(
            Gate::block_encode(encoding),
            wires.iter().copied(),
        ))?;
        Ok(self)
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Run `body` on a fresh sub-circuit and append every operation it emits
    /// conditioned on `controls` matching `values`.
    ///
    /// A global phase accumulated by the body becomes a controlled
    /// `gphase`, i.e. a relative phase on the selected subspace. With no
    /// controls it is added to this circuit's global phase. Nothing is
    /// appended if the body or any lifted operation fails.
    pub fn controlled<F>(
        &mut self,
        controls: &[QubitId],
        values: &[bool],
        body: F,
    ) -> IrResult<&mut Self>
    where
        F: FnOnce(&mut Circuit) -> IrResult<()>,
    {
        if controls.len() != values.len() {
            return Err(IrError::ControlPatternMismatch {
                controls: controls.len(),
                values: values.len(),
            });
        }

        let mut inner = self.fork();
        body(&mut inner)?;
        let phase = inner.dag.global_phase();

        let mut lifted = inner
            .dag
            .into_instructions()
            .into_iter()
            .map(|inst| {
                trace!(gate = inst.name(), controls = controls.len(), "lifting");
                inst.controlled(controls, values)
            })
            .collect::<IrResult<Vec<_>>>()?;
        if phase != 0.0 && !controls.is_empty() {
            lifted.push(
                Instruction::gate(StandardGate::GlobalPhase(phase), [] as [QubitId; 0])
                    .controlled(controls, values)?,
            );
        }

        self.dag.extend(lifted)?;
        if controls.is_empty() {
            self.global_phase(phase);
        }
        Ok(self)
    }

    /// An empty circuit over the same qubits.
    pub fn fork(&self) -> Circuit {
        let mut dag = CircuitDag::new();
        for qubit in &self.qubits {
            dag.add_qubit(qubit.id);
        }
        Circuit {
            name: self.name.clone(),
            qubits: self.qubits.clone(),
            dag,
            next_qubit_id: self.next_qubit_id,
        }
    }

    /// Append all operations of `other`, matching qubits by id.
    ///
    /// Either every operation is appended or, on error, none is.
    pub fn append(&mut self, other: Circuit) -> IrResult<&mut Self> {
        let phase = other.dag.global_phase();
        self.dag.extend(other.dag.into_instructions())?;
        self.global_phase(phase);
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Get the number of operations.
    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    /// Get the qubits.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Ids of the qubits belonging to register `name`, in register order.
    pub fn register(&self, name: &str) -> Vec<QubitId> {
        let mut members: Vec<(u32, QubitId)> = self
            .qubits
            .iter()
            .filter(|q| q.register.as_deref() == Some(name))
            .filter_map(|q| q.index.map(|i| (i, q.id)))
            .collect();
        members.sort_unstable();
        members.into_iter().map(|(_, id)| id).collect()
    }

    /// Get the accumulated global phase.
    pub fn phase(&self) -> f64 {
        self.dag.global_phase()
    }

    /// Operations in execution order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.dag.topological_ops().map(|(_, inst)| inst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateKind;
    use std::f64::consts::PI;

    #[test]
    fn test_registers() {
        let mut circuit = Circuit::new("be");
        let enc = circuit.add_qreg("enc", 2);
        let sys = circuit.add_qreg("sys", 3);
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(enc, vec![QubitId(0), QubitId(1)]);
        assert_eq!(circuit.register("sys"), sys);
        assert!(circuit.register("anc").is_empty());
    }

    #[test]
    fn test_standard_gates() {
        let mut circuit = Circuit::with_size("paulis", 2);
        circuit
            .x(QubitId(0))
            .unwrap()
            .y(QubitId(1))
            .unwrap()
            .z(QubitId(0))
            .unwrap();
        assert_eq!(circuit.num_ops(), 3);
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_controlled_lifts_body() {
        let mut circuit = Circuit::with_size("ctrl", 3);
        circuit
            .controlled(&[QubitId(0)], &[false], |c| {
                c.x(QubitId(1))?.z(QubitId(2))?;
                Ok(())
            })
            .unwrap();

        let ops: Vec<&Instruction> = circuit.instructions().collect();
        assert_eq!(ops.len(), 2);
        for op in ops {
            assert_eq!(op.controls, vec![QubitId(0)]);
            assert_eq!(op.control_values, vec![false]);
        }
    }

    #[test]
    fn test_controlled_phase_becomes_gate() {
        let mut circuit = Circuit::with_size("phase", 2);
        circuit
            .controlled(&[QubitId(0)], &[true], |c| {
                c.global_phase(PI).x(QubitId(1))?;
                Ok(())
            })
            .unwrap();

        assert_eq!(circuit.phase(), 0.0);
        let phases: Vec<&Instruction> = circuit
            .instructions()
            .filter(|i| matches!(i.gate.kind, GateKind::Standard(StandardGate::GlobalPhase(_))))
            .collect();
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].controls, vec![QubitId(0)]);
    }

    #[test]
    fn test_uncontrolled_phase_is_global() {
        let mut circuit = Circuit::with_size("phase", 1);
        circuit
            .controlled(&[], &[], |c| {
                c.global_phase(PI);
                Ok(())
            })
            .unwrap();
        assert_eq!(circuit.num_ops(), 0);
        assert!((circuit.phase() - PI).abs() < 1e-15);
    }

    #[test]
    fn test_nested_controls() {
        let mut circuit = Circuit::with_size("nested", 3);
        circuit
            .controlled(&[QubitId(0)], &[true], |outer| {
                outer.controlled(&[QubitId(1)], &[false], |inner| {
                    inner.x(QubitId(2))?;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();
        let op = circuit.instructions().next().unwrap();
        assert_eq!(op.controls, vec![QubitId(0), QubitId(1)]);
        assert_eq!(op.control_values, vec![true, false]);
    }

    #[test]
    fn test_failed_body_leaves_circuit_untouched() {
        let mut circuit = Circuit::with_size("atomic", 2);
        let result = circuit.controlled(&[QubitId(0)], &[true], |c| {
            c.x(QubitId(1))?;
            c.x(QubitId(0))?;
            Ok(())
        });
        // Body succeeds on its own, but lifting makes q0 both control and target.
        assert!(matches!(result, Err(IrError::DuplicateQubit { .. })));
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_repeated_controlled_bodies_keep_order() {
        let mut circuit = Circuit::with_size("select", 3);
        circuit.x(QubitId(2)).unwrap();
        for i in 0..4usize {
            let pattern = [i & 2 != 0, i & 1 != 0];
            circuit
                .controlled(&[QubitId(0), QubitId(1)], &pattern, |c| {
                    c.z(QubitId(2))?;
                    Ok(())
                })
                .unwrap();
        }
        // A failing body in the middle of the sequence leaves it intact.
        assert!(circuit
            .controlled(&[QubitId(0)], &[true], |c| {
                c.y(QubitId(0))?;
                Ok(())
            })
            .is_err());

        let ops: Vec<String> = circuit.instructions().map(ToString::to_string).collect();
        assert_eq!(
            ops,
            vec![
                "x q2",
                "ctrl(q0=0,q1=0) z q2",
                "ctrl(q0=0,q1=1) z q2",
                "ctrl(q0=1,q1=0) z q2",
                "ctrl(q0=1,q1=1) z q2",
            ]
        );
    }

    #[test]
    fn test_state_prep_on_empty_register() {
        let mut circuit = Circuit::with_size("prep", 1);
        circuit.state_prep(&[1.0], &[]).unwrap();
        assert_eq!(circuit.num_ops(), 0);
        assert!(circuit.state_prep(&[0.6, 0.8], &[]).is_err());
    }

    #[test]
    fn test_state_prep_dagger_flag() {
        let mut circuit = Circuit::with_size("prep", 1);
        let amps = [0.6, 0.8];
        circuit
            .state_prep(&amps, &[QubitId(0)])
            .unwrap()
            .state_prep_dg(&amps, &[QubitId(0)])
            .unwrap();
        let flags: Vec<bool> = circuit.instructions().map(|i| i.gate.adjoint).collect();
        assert_eq!(flags, vec![false, true]);
    }

    #[test]
    fn test_block_encode_gate() {
        let mut circuit = Circuit::with_size("be", 2);
        let half = Complex64::new(0.5, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        circuit
            .block_encode(vec![half, zero, zero, half], 2, &[QubitId(0), QubitId(1)])
            .unwrap();
        assert_eq!(circuit.num_ops(), 1);
        assert!(
            circuit
                .block_encode(vec![half; 4], 2, &[QubitId(0)])
                .is_err()
        );
    }
}
