//! Preprocess command implementation.

use anyhow::{Context, Result};

use qbm_encode::Hamiltonian;

use super::common::{OutputFormat, print_hamiltonian};

/// Execute the preprocess command.
pub fn execute(terms: &[String], coeffs: &[f64], delta: f64, format: OutputFormat) -> Result<()> {
    let hamiltonian = Hamiltonian::new(terms, coeffs.to_vec()).context("invalid Hamiltonian")?;
    let shifted = hamiltonian
        .preprocessed(delta)
        .with_context(|| format!("cannot preprocess with delta = {delta}"))?;
    print_hamiltonian(&shifted, format)
}
