//! Integration tests for circuit construction and composition.

use proptest::prelude::*;
use qbm_ir::{Circuit, GateKind, IrError, QubitId, StandardGate, StatePreparation};

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

#[test]
fn test_append_is_atomic() {
    let mut target = Circuit::with_size("target", 1);
    let mut source = Circuit::with_size("source", 2);
    source.x(QubitId(0)).unwrap().x(QubitId(1)).unwrap();

    let result = target.append(source);
    assert!(matches!(result, Err(IrError::QubitNotFound { .. })));
    assert_eq!(target.num_ops(), 0);
}

#[test]
fn test_append_accumulates_phase() {
    let mut target = Circuit::with_size("target", 1);
    target.global_phase(0.25);
    let mut source = target.fork();
    source.global_phase(0.5).z(QubitId(0)).unwrap();

    target.append(source).unwrap();
    assert!((target.phase() - 0.75).abs() < 1e-15);
    assert_eq!(target.num_ops(), 1);
}

#[test]
fn test_fork_keeps_registers() {
    let mut circuit = Circuit::new("be");
    let enc = circuit.add_qreg("enc", 1);
    circuit.add_qreg("sys", 2);
    circuit.x(enc[0]).unwrap();

    let fork = circuit.fork();
    assert_eq!(fork.num_qubits(), 3);
    assert_eq!(fork.num_ops(), 0);
    assert_eq!(fork.register("enc"), enc);
}

#[test]
fn test_select_style_body() {
    // Two controlled Pauli products with a sign flip on the second.
    let mut circuit = Circuit::new("select");
    let enc = circuit.add_qreg("enc", 1);
    let sys = circuit.add_qreg("sys", 2);

    circuit
        .controlled(&enc, &[false], |c| {
            c.z(sys[0])?;
            Ok(())
        })
        .unwrap()
        .controlled(&enc, &[true], |c| {
            c.x(sys[0])?.x(sys[1])?;
            c.global_phase(std::f64::consts::PI);
            Ok(())
        })
        .unwrap();

    let names: Vec<String> = circuit.instructions().map(ToString::to_string).collect();
    assert_eq!(
        names,
        vec![
            "ctrl(q0=0) z q1",
            "ctrl(q0=1) x q1",
            "ctrl(q0=1) x q2",
            "ctrl(q0=1) gphase(3.141593)",
        ]
    );
}

#[test]
fn test_control_pattern_length_checked() {
    let mut circuit = Circuit::with_size("bad", 2);
    let result = circuit.controlled(&[QubitId(0)], &[true, true], |c| {
        c.x(QubitId(1))?;
        Ok(())
    });
    assert!(matches!(
        result,
        Err(IrError::ControlPatternMismatch { .. })
    ));
}

// ---------------------------------------------------------------------------
// State preparation
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_normalised_weights_are_accepted(
        weights in prop::collection::vec(0.01f64..10.0, 1..9)
    ) {
        let total: f64 = weights.iter().sum();
        let amplitudes: Vec<f64> = weights.iter().map(|w| (w / total).sqrt()).collect();
        let n = amplitudes.len().next_power_of_two().trailing_zeros();

        let prep = StatePreparation::new(&amplitudes, n).unwrap();
        let wires: Vec<QubitId> = (0..n).map(QubitId).collect();
        let ops = prep.decompose(&wires, false).unwrap();

        prop_assert!(ops.len() < (1usize << n).max(2));
        for op in &ops {
            let is_ry = matches!(op.gate.kind, GateKind::Standard(StandardGate::Ry(_)));
            prop_assert!(is_ry);
        }
    }
}
