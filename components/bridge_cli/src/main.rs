//! Corten Bridge CLI
//!
//! Entry point of the bridge runtime. Parses CLI arguments and delegates to
//! the Runtime for execution.

use bridge_cli::{Cli, CliError, Runtime};
use clap::Parser as ClapParser;
use host_runtime::HostValue;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.trace);

    let config = match cli.bridge_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let runtime = Runtime::new(config);

    let outcome = if let Some(file) = &cli.file {
        runtime.execute_file(file).map(print_result)
    } else if let Some(code) = &cli.eval {
        runtime.execute_string(code).map(print_result)
    } else if cli.repl {
        runtime.repl()
    } else {
        println!("Corten Bridge v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage:");
        println!("  corten-bridge --file <FILE>     Execute a script file");
        println!("  corten-bridge --eval <CODE>     Evaluate inline script code");
        println!("  corten-bridge --repl            Start interactive REPL");
        println!();
        println!("Run 'corten-bridge --help' for more options.");
        Ok(())
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Io(e)) => {
            eprintln!("Error: Could not read file: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_result(result: HostValue) {
    if !result.is_undef() {
        println!("{}", result);
    }
}

fn init_tracing(enabled: bool) {
    if !enabled {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
