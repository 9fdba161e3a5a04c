//! Output and verification shared by the encoding commands.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use console::style;
use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;
use tracing::info;

use qbm_encode::{BlockEncoder, EncodingScheme, Hamiltonian, Register, Selection};
use qbm_ir::{Circuit, Instruction, QubitId};
use qbm_sim::{circuit_unitary, leading_block};

/// Largest entrywise deviation accepted by `--verify`.
const VERIFY_TOLERANCE: f64 = 1e-8;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// JSON shape of an encoded circuit.
#[derive(Serialize)]
struct EncodingReport<'a> {
    scheme: EncodingScheme,
    subnormalization: f64,
    encoding_wires: Vec<QubitId>,
    system_wires: Vec<QubitId>,
    hamiltonian: &'a Hamiltonian,
    global_phase: f64,
    depth: usize,
    instructions: Vec<&'a Instruction>,
}

/// Build the encoder's circuit, print it and optionally verify it.
pub fn report(encoder: &BlockEncoder, format: OutputFormat, verify: bool) -> Result<()> {
    let circuit = encoder
        .build_circuit()
        .context("failed to emit block encoding")?;
    let enc = circuit.register(Register::Encoding.qreg_name());
    let sys = circuit.register(Register::System.qreg_name());

    match format {
        OutputFormat::Json => {
            let report = EncodingReport {
                scheme: encoder.scheme(),
                subnormalization: encoder.subnormalization(),
                encoding_wires: enc.clone(),
                system_wires: sys.clone(),
                hamiltonian: encoder.hamiltonian(),
                global_phase: circuit.phase(),
                depth: circuit.depth(),
                instructions: circuit.instructions().collect(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => print_text(encoder, &circuit, &enc, &sys),
    }

    if verify {
        let deviation = max_deviation(encoder, &circuit, &enc, &sys)?;
        info!(deviation, "verified leading block");
        if deviation > VERIFY_TOLERANCE {
            bail!("leading block deviates from H / norm by {deviation:.3e}");
        }
        if format == OutputFormat::Text {
            println!(
                "{} Leading block matches H / {:.6} (max deviation {:.3e})",
                style("✓").green().bold(),
                encoder.subnormalization(),
                deviation
            );
        }
    }

    Ok(())
}

fn print_text(encoder: &BlockEncoder, circuit: &Circuit, enc: &[QubitId], sys: &[QubitId]) {
    println!(
        "{} {} block encoding of {}",
        style("→").cyan().bold(),
        style(encoder.scheme()).yellow(),
        style(encoder.hamiltonian()).green()
    );
    println!("  Subnormalization: {}", encoder.subnormalization());
    println!("  Encoding qubits:  {}", enc.len());
    println!("  System qubits:    {}", sys.len());
    println!(
        "  Circuit:          {} ops, depth {}",
        circuit.num_ops(),
        circuit.depth()
    );
    if circuit.phase() != 0.0 {
        println!("  Global phase:     {}", circuit.phase());
    }
    for (i, inst) in circuit.instructions().enumerate() {
        println!("  {:>4}  {}", style(i).dim(), inst);
    }
}

/// Largest entrywise gap between the simulated leading block and H / norm.
pub fn max_deviation(
    encoder: &BlockEncoder,
    circuit: &Circuit,
    enc: &[QubitId],
    sys: &[QubitId],
) -> Result<f64> {
    let wires: Vec<QubitId> = enc.iter().chain(sys).copied().collect();
    let unitary = circuit_unitary(circuit, &wires).context("simulation failed")?;
    let block = leading_block(&unitary, 1usize << sys.len());

    let norm = encoder.subnormalization();
    let target: Array2<Complex64> = encoder
        .hamiltonian()
        .assemble(Selection::All)?
        .mapv(|z| z / norm);

    Ok(block
        .iter()
        .zip(target.iter())
        .map(|(a, b)| (a - b).norm())
        .fold(0.0, f64::max))
}

/// Print a Hamiltonian term by term.
pub fn print_hamiltonian(hamiltonian: &Hamiltonian, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(hamiltonian)?),
        OutputFormat::Text => {
            println!(
                "{} {} terms on {} qubits, norm {}",
                style("→").cyan().bold(),
                hamiltonian.n_params(),
                hamiltonian.n_qubits(),
                hamiltonian.norm()
            );
            for (term, c) in hamiltonian.terms().iter().zip(hamiltonian.coefficients()) {
                println!("  {:>+.6}  {}", c, style(term).green());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_both_schemes() {
        for scheme in [EncodingScheme::General, EncodingScheme::Lcu] {
            let encoder = BlockEncoder::new(&["XZ", "YY", "ZI"], vec![0.5, -1.0, 0.25], scheme)
                .unwrap();
            let circuit = encoder.build_circuit().unwrap();
            let enc = circuit.register("enc");
            let sys = circuit.register("sys");
            let deviation = max_deviation(&encoder, &circuit, &enc, &sys).unwrap();
            assert!(deviation < VERIFY_TOLERANCE, "{scheme}: {deviation}");
        }
    }

    #[test]
    fn test_output_format_values() {
        assert_eq!(
            OutputFormat::from_str("json", true).unwrap(),
            OutputFormat::Json
        );
        assert!(OutputFormat::from_str("yaml", true).is_err());
    }
}
