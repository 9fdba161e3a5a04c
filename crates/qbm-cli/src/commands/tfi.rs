//! Transverse-field Ising command implementation.

use anyhow::{Context, Result};

use qbm_encode::{BlockEncoder, EncodingScheme, Hamiltonian};

use super::common::{OutputFormat, report};

/// Execute the tfi command.
pub fn execute(
    qubits: usize,
    coupling: f64,
    field: f64,
    scheme: EncodingScheme,
    format: OutputFormat,
    verify: bool,
) -> Result<()> {
    let hamiltonian = Hamiltonian::transverse_field_ising(qubits, coupling, field)
        .with_context(|| format!("cannot build a {qubits}-site Ising chain"))?;
    let encoder =
        BlockEncoder::from_hamiltonian(hamiltonian, scheme).context("cannot encode Ising chain")?;
    report(&encoder, format, verify)
}
