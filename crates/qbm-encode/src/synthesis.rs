//! Pauli-string gate emission.
//!
//! A Pauli string `P = P_0 ⊗ … ⊗ P_{L-1}` is applied factor by factor: wire
//! `k` receives the X, Y or Z gate named by character `k`, identities emit
//! nothing. A requested sign flip is one `gphase(π)`, which becomes a
//! relative phase when the whole string is emitted inside a controlled body.

use std::f64::consts::PI;

use qbm_ir::{Circuit, IrResult, QubitId};

use crate::error::{EncodeError, EncodeResult};
use crate::hamiltonian::{PauliOp, PauliString};

/// Apply `pauli` (or `-pauli` when `negate` is set) to `wires`.
pub fn append_pauli_string(
    circuit: &mut Circuit,
    pauli: &PauliString,
    wires: &[QubitId],
    negate: bool,
) -> EncodeResult<()> {
    if pauli.len() != wires.len() {
        return Err(EncodeError::PauliLengthMismatch {
            pauli: pauli.len(),
            wires: wires.len(),
        });
    }
    emit_pauli_ops(circuit, pauli.ops(), wires, negate)?;
    Ok(())
}

/// Gate emission without the length check, for use inside IR bodies.
pub(crate) fn emit_pauli_ops(
    circuit: &mut Circuit,
    ops: &[PauliOp],
    wires: &[QubitId],
    negate: bool,
) -> IrResult<()> {
    for (&op, &wire) in ops.iter().zip(wires) {
        match op {
            PauliOp::I => {}
            PauliOp::X => {
                circuit.x(wire)?;
            }
            PauliOp::Y => {
                circuit.y(wire)?;
            }
            PauliOp::Z => {
                circuit.z(wire)?;
            }
        }
    }
    if negate {
        circuit.global_phase(PI);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_factors_emit_nothing() {
        let mut circuit = Circuit::with_size("p", 3);
        let wires = [QubitId(0), QubitId(1), QubitId(2)];
        let pauli: PauliString = "XIY".parse().unwrap();
        append_pauli_string(&mut circuit, &pauli, &wires, false).unwrap();

        let gates: Vec<String> = circuit.instructions().map(ToString::to_string).collect();
        assert_eq!(gates, vec!["x q0", "y q2"]);
        assert_eq!(circuit.phase(), 0.0);
    }

    #[test]
    fn test_negate_is_single_phase() {
        let mut circuit = Circuit::with_size("p", 2);
        let wires = [QubitId(0), QubitId(1)];
        let pauli: PauliString = "ZZ".parse().unwrap();
        append_pauli_string(&mut circuit, &pauli, &wires, true).unwrap();
        assert_eq!(circuit.num_ops(), 2);
        assert!((circuit.phase() - PI).abs() < 1e-15);
    }

    #[test]
    fn test_length_mismatch() {
        let mut circuit = Circuit::with_size("p", 2);
        let pauli: PauliString = "XYZ".parse().unwrap();
        let result = append_pauli_string(&mut circuit, &pauli, &[QubitId(0), QubitId(1)], false);
        assert!(matches!(
            result,
            Err(EncodeError::PauliLengthMismatch { pauli: 3, wires: 2 })
        ));
        assert_eq!(circuit.num_ops(), 0);
    }
}
