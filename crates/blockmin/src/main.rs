//! blockmin CLI - HTML build-block preprocessor.
//!
//! Provides commands for:
//! - `build`: Rewrite a document and emit its build instructions
//! - `check`: Parse a document and report what building it would do

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CheckArgs};
use output::Output;

/// blockmin - replace build blocks in HTML with their bundled assets.
#[derive(Parser)]
#[command(name = "blockmin", version, about)]
struct Cli {
    /// Enable verbose output (handler progress and build instructions).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a document and write its build instructions.
    Build(BuildArgs),
    /// Parse a document without writing anything.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to ERROR
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout may carry the rewritten document
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
