//! Encode command implementation.

use anyhow::{Context, Result};

use qbm_encode::{BlockEncoder, EncodingScheme};

use super::common::{OutputFormat, report};

/// Execute the encode command.
pub fn execute(
    terms: &[String],
    coeffs: &[f64],
    scheme: EncodingScheme,
    format: OutputFormat,
    verify: bool,
) -> Result<()> {
    let encoder = BlockEncoder::new(terms, coeffs.to_vec(), scheme)
        .context("invalid Hamiltonian")?;
    report(&encoder, format, verify)
}
