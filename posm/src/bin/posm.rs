//! Command-line front-end of the Pocol assembler.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use posm::AsmError;

#[derive(Parser)]
#[command(name = "posm", version, about = "Pocol assembler")]
struct Args {
    /// Assembly source file.
    input: PathBuf,

    /// Output object file.
    #[arg(default_value = "out.pob")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let path = args.input.display();

    match posm::assemble_file(&args.input, &args.output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AsmError::Failed { diagnostics }) => {
            for diagnostic in &diagnostics {
                if diagnostic.line > 0 {
                    eprintln!("{path}:{diagnostic}");
                } else {
                    eprintln!("{path}: {diagnostic}");
                }
            }
            eprintln!("{path}: compilation failed ({} total errors)", diagnostics.len());

            ExitCode::FAILURE
        }
        Err(AsmError::Io(e)) => {
            eprintln!("posm: {path}: {e}");

            ExitCode::FAILURE
        }
    }
}
