//! Command-line front-end of the Pocol VM.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pocol_vm::consts::NO_LIMIT;
use pocol_vm::interpreter::Interpreter;

#[derive(Parser)]
#[command(name = "pm", version, about = "Pocol virtual machine")]
struct Args {
    /// Object file produced by posm.
    object: PathBuf,

    /// Maximum number of instructions to execute; negative means no bound.
    #[arg(default_value_t = NO_LIMIT, allow_negative_numbers = true)]
    limit: i64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut vm = Interpreter::stdout();
    if let Err(e) = vm.load_file(&args.object) {
        eprintln!("pm: {}: {e}", args.object.display());
        return ExitCode::FAILURE;
    }

    let result = vm.run(args.limit);

    // `print` emits no trailing newline; make sure the bytes leave before
    // the process does
    io::stdout().flush().ok();

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pm: {}: {e}", args.object.display());
            ExitCode::from(e.code())
        }
    }
}
