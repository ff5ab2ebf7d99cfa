//! Checkwire CLI entry point.

use clap::Parser;
use checkwire::cli::{self, Cli, Commands, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CHECKWIRE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Plan(args) => cli::run_plan(args),
        Commands::Fetch(args) => cli::run_fetch(args),
        Commands::Tools => cli::run_tools(),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
