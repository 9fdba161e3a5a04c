//! qbm Command-Line Interface
//!
//! Encode LCU Hamiltonians as unitary block encodings and inspect the
//! resulting circuits.
//!
//! ```text
//! qbm encode --terms XXI,IXX,ZII,IZI,IIZ --coeffs -1,-1,-0.5,-0.5,-0.5 --scheme lcu --verify
//! qbm preprocess --terms X,Z --coeffs 1,-1 --delta 0.1
//! qbm tfi --qubits 3 --coupling 1 --field 0.5 --format json
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use qbm_encode::EncodingScheme;

mod commands;

use commands::common::OutputFormat;
use commands::{encode, preprocess, tfi};

/// qbm - block encodings of LCU Hamiltonians
#[derive(Parser)]
#[command(name = "qbm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Block-encode a Hamiltonian given as Pauli strings and coefficients
    Encode {
        /// Pauli strings, comma separated (e.g. XXI,IXX)
        #[arg(short, long, value_delimiter = ',', required = true)]
        terms: Vec<String>,

        /// Coefficients, comma separated and paired with the terms
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
        coeffs: Vec<f64>,

        /// Encoding scheme (general, lcu)
        #[arg(short, long, env = "QBM_SCHEME", default_value = "lcu")]
        scheme: EncodingScheme,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Simulate the circuit and check its leading block against H / norm
        #[arg(long)]
        verify: bool,
    },

    /// Shift and rescale a Hamiltonian's spectrum into [delta, 1]
    Preprocess {
        /// Pauli strings, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        terms: Vec<String>,

        /// Coefficients, comma separated
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
        coeffs: Vec<f64>,

        /// Lower end of the target spectrum (must be < 1)
        #[arg(short, long, allow_negative_numbers = true)]
        delta: f64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Block-encode an open transverse-field Ising chain
    Tfi {
        /// Number of spins
        #[arg(short, long, default_value = "3")]
        qubits: usize,

        /// XX coupling J
        #[arg(short, long, default_value = "1.0", allow_negative_numbers = true)]
        coupling: f64,

        /// Transverse field g
        #[arg(long, default_value = "0.5", allow_negative_numbers = true)]
        field: f64,

        /// Encoding scheme (general, lcu)
        #[arg(short, long, env = "QBM_SCHEME", default_value = "lcu")]
        scheme: EncodingScheme,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Simulate the circuit and check its leading block against H / norm
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Encode {
            terms,
            coeffs,
            scheme,
            format,
            verify,
        } => encode::execute(&terms, &coeffs, scheme, format, verify),

        Commands::Preprocess {
            terms,
            coeffs,
            delta,
            format,
        } => preprocess::execute(&terms, &coeffs, delta, format),

        Commands::Tfi {
            qubits,
            coupling,
            field,
            scheme,
            format,
            verify,
        } => tfi::execute(qubits, coupling, field, scheme, format, verify),
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
