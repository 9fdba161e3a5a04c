//! qbm Circuit Intermediate Representation
//!
//! This crate provides the circuit data structures the qbm block encoders
//! emit into. It plays the role of the execution engine's circuit context:
//! wires are [`QubitId`]s, operations are appended to a DAG, and the
//! [`Circuit::controlled`] combinator lifts an entire sub-circuit under a
//! control bit pattern.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] and [`Qubit`] with optional register membership
//! - **Gates**: [`StandardGate`] for the Pauli, RY and global-phase gates,
//!   [`StatePreparation`] and [`BlockEncoding`] for composite operations
//! - **Instructions**: [`Instruction`] combining a gate with targets and controls
//! - **DAG**: [`CircuitDag`] for the internal graph representation
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example: A Controlled Body
//!
//! ```rust
//! use qbm_ir::{Circuit, QubitId};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::with_size("select", 2);
//!
//! // Apply -X on q1 when q0 is |0⟩.
//! circuit
//!     .controlled(&[QubitId(0)], &[false], |body| {
//!         body.x(QubitId(1))?;
//!         body.global_phase(PI);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(circuit.num_ops(), 2);
//! ```
//!
//! # Bit Order
//!
//! Everything in this crate is big-endian over wire lists: the first wire of a
//! register carries the most significant bit of a basis index, both for
//! state-preparation amplitudes and for control patterns.

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex};
pub use error::{IrError, IrResult};
pub use gate::{BlockEncoding, Gate, GateKind, StandardGate, StatePreparation};
pub use instruction::Instruction;
pub use qubit::{Qubit, QubitId};
