//! DAG-based circuit representation.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(QubitId),
    /// Output node for a wire.
    Out(QubitId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// An edge in the circuit DAG, carrying the wire it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The qubit wire this edge represents.
    pub wire: QubitId,
}

/// Append-only DAG of instructions.
///
/// Every qubit owns an `In` and an `Out` node; each operation is spliced in
/// front of the `Out` node of every wire it touches, controls included.
/// Nodes are never removed, so node-index order is a topological order.
#[derive(Debug, Clone)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    qubit_inputs: FxHashMap<QubitId, NodeIndex>,
    qubit_outputs: FxHashMap<QubitId, NodeIndex>,
    /// Node just before the output node of each wire.
    wire_front: FxHashMap<QubitId, NodeIndex>,
    global_phase: f64,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::default(),
            qubit_inputs: FxHashMap::default(),
            qubit_outputs: FxHashMap::default(),
            wire_front: FxHashMap::default(),
            global_phase: 0.0,
        }
    }

    /// Add a qubit wire. Adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.qubit_inputs.contains_key(&qubit) {
            return;
        }
        let in_node = self.graph.add_node(DagNode::In(qubit));
        let out_node = self.graph.add_node(DagNode::Out(qubit));
        self.graph.add_edge(in_node, out_node, DagEdge { wire: qubit });
        self.qubit_inputs.insert(qubit, in_node);
        self.qubit_outputs.insert(qubit, out_node);
        self.wire_front.insert(qubit, in_node);
    }

    /// Validate an instruction and append it to the DAG.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        self.validate(&instruction)?;

        let wires: Vec<QubitId> = instruction.wires().collect();
        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for qubit in wires {
            let out_node = self.qubit_outputs[&qubit];
            let prev_node = self.wire_front[&qubit];

            let eid = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == qubit && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Missing edge from predecessor to output for wire {qubit:?}"
                    ))
                })?;
            self.graph.remove_edge(eid);
            self.graph.add_edge(prev_node, op_node, DagEdge { wire: qubit });
            self.graph.add_edge(op_node, out_node, DagEdge { wire: qubit });
            self.wire_front.insert(qubit, op_node);
        }

        Ok(op_node)
    }

    /// Append a batch of instructions.
    ///
    /// Every instruction is validated before the first one is spliced in, so
    /// on error the DAG is unchanged. Validation only depends on the wire set,
    /// which appending never changes.
    pub fn extend(&mut self, instructions: Vec<Instruction>) -> IrResult<()> {
        for instruction in &instructions {
            self.validate(instruction)?;
        }
        for instruction in instructions {
            self.apply(instruction)?;
        }
        Ok(())
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let gate_name = instruction.name().to_string();

        let expected = instruction.gate.num_qubits();
        let got = instruction.qubits.len() as u32;
        if expected != got {
            return Err(IrError::QubitCountMismatch {
                gate_name,
                expected,
                got,
            });
        }

        if instruction.controls.len() != instruction.control_values.len() {
            return Err(IrError::ControlPatternMismatch {
                controls: instruction.controls.len(),
                values: instruction.control_values.len(),
            });
        }

        if instruction.wires().next().is_none() {
            return Err(IrError::EmptyInstruction(gate_name));
        }

        let mut seen = FxHashSet::default();
        for qubit in instruction.wires() {
            if !self.qubit_inputs.contains_key(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: Some(gate_name),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: Some(gate_name),
                });
            }
        }
        Ok(())
    }

    /// Iterate over operations in topological (insertion) order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// Consume the DAG and return its instructions in topological order.
    pub fn into_instructions(self) -> Vec<Instruction> {
        let (nodes, _) = self.graph.into_nodes_edges();
        nodes
            .into_iter()
            .filter_map(|node| match node.weight {
                DagNode::Op(inst) => Some(inst),
                _ => None,
            })
            .collect()
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubit_inputs.len()
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph
            .node_count()
            .saturating_sub(2 * self.qubit_inputs.len())
    }

    /// Calculate the circuit depth (longest chain of operations on any path).
    pub fn depth(&self) -> usize {
        let mut depths: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(self.graph.node_count(), Default::default());
        let mut max_depth = 0usize;

        for node in self.graph.node_indices() {
            let max_pred_depth = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths.get(&e.source()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);

            let node_depth = if matches!(self.graph[node], DagNode::Op(_)) {
                max_pred_depth + 1
            } else {
                max_pred_depth
            };
            max_depth = max_depth.max(node_depth);
            depths.insert(node, node_depth);
        }

        max_depth
    }

    /// Get the global phase.
    pub fn global_phase(&self) -> f64 {
        self.global_phase
    }

    /// Set the global phase.
    pub fn set_global_phase(&mut self, phase: f64) {
        self.global_phase = phase;
    }
}

impl Default for CircuitDag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn dag_with(n: u32) -> CircuitDag {
        let mut dag = CircuitDag::new();
        for q in 0..n {
            dag.add_qubit(QubitId(q));
        }
        dag
    }

    #[test]
    fn test_empty_dag() {
        let dag = CircuitDag::new();
        assert_eq!(dag.num_qubits(), 0);
        assert_eq!(dag.num_ops(), 0);
        assert_eq!(dag.depth(), 0);
    }

    #[test]
    fn test_apply_gate() {
        let mut dag = dag_with(2);
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        assert_eq!(dag.num_ops(), 1);
        assert_eq!(dag.depth(), 1);
    }

    #[test]
    fn test_parallel_gates_depth() {
        let mut dag = dag_with(3);
        for q in 0..3 {
            dag.apply(Instruction::single_qubit_gate(StandardGate::Z, QubitId(q)))
                .unwrap();
        }
        assert_eq!(dag.num_ops(), 3);
        assert_eq!(dag.depth(), 1);
    }

    #[test]
    fn test_controls_serialize_on_their_wires() {
        let mut dag = dag_with(3);
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(1)))
            .unwrap();
        let controlled = Instruction::single_qubit_gate(StandardGate::Z, QubitId(2))
            .controlled(&[QubitId(1)], &[true])
            .unwrap();
        dag.apply(controlled).unwrap();
        assert_eq!(dag.depth(), 2);
    }

    #[test]
    fn test_gate_arity_mismatch() {
        let mut dag = dag_with(2);
        let bad = Instruction::gate(StandardGate::X, [QubitId(0), QubitId(1)]);
        assert!(matches!(
            dag.apply(bad),
            Err(IrError::QubitCountMismatch {
                expected: 1,
                got: 2,
                ..
            })
        ));
        assert_eq!(dag.num_ops(), 0);
    }

    #[test]
    fn test_qubit_not_found_with_context() {
        let mut dag = dag_with(1);
        let err = dag
            .apply(Instruction::single_qubit_gate(StandardGate::Y, QubitId(5)))
            .unwrap_err();
        assert!(err.to_string().contains("(gate: y)"));
    }

    #[test]
    fn test_control_overlapping_target_rejected() {
        let mut dag = dag_with(2);
        let bad = Instruction::single_qubit_gate(StandardGate::X, QubitId(0))
            .controlled(&[QubitId(0)], &[true])
            .unwrap();
        assert!(matches!(
            dag.apply(bad),
            Err(IrError::DuplicateQubit { .. })
        ));
    }

    #[test]
    fn test_uncontrolled_global_phase_rejected() {
        let mut dag = dag_with(1);
        let phase = Instruction::gate(StandardGate::GlobalPhase(1.0), [] as [QubitId; 0]);
        assert!(matches!(
            dag.apply(phase),
            Err(IrError::EmptyInstruction(_))
        ));
    }

    #[test]
    fn test_extend_is_all_or_nothing() {
        let mut dag = dag_with(2);
        let batch = vec![
            Instruction::single_qubit_gate(StandardGate::X, QubitId(0)),
            Instruction::single_qubit_gate(StandardGate::Z, QubitId(1)),
            Instruction::single_qubit_gate(StandardGate::Y, QubitId(9)),
        ];
        assert!(matches!(
            dag.extend(batch),
            Err(IrError::QubitNotFound { qubit: QubitId(9), .. })
        ));
        assert_eq!(dag.num_ops(), 0);

        dag.extend(vec![
            Instruction::single_qubit_gate(StandardGate::X, QubitId(0)),
            Instruction::single_qubit_gate(StandardGate::Z, QubitId(0)),
        ])
        .unwrap();
        assert_eq!(dag.num_ops(), 2);
        assert_eq!(dag.depth(), 2);
    }

    #[test]
    fn test_into_instructions_preserves_order() {
        let mut dag = dag_with(2);
        dag.apply(Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::Y, QubitId(1)))
            .unwrap();
        dag.apply(Instruction::single_qubit_gate(StandardGate::Z, QubitId(0)))
            .unwrap();
        let names: Vec<String> = dag
            .into_instructions()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }
}
