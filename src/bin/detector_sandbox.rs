//! detector-sandbox: A developer CLI for hosting diagnostic detectors locally
//!
//! Detectors are JSON manifests bound to the built-in routines (`echo`,
//! `noop`, `count`).
//!
//! ## Features
//!
//! - **check**: Compile and validate a manifest
//! - **run**: Invoke a detector's entry point
//! - **export**: Save the compiled artifact, or print it as base64
//! - **inspect**: Load an exported artifact and show its metadata
//!
//! ## Example Usage
//!
//! ```bash
//! # Compile and validate
//! detector-sandbox check ./cpu.json
//!
//! # Invoke with arguments
//! detector-sandbox run ./cpu.json --arg '[1, 2, 3]'
//!
//! # Export, then inspect the artifact
//! detector-sandbox export ./cpu.json --out ./cpu.detector
//! detector-sandbox inspect ./cpu.detector
//!
//! # Restrict what a manifest may reference
//! detector-sandbox --reference metrics check ./cpu.json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod detector_cli;

use detector_cli::{
    check::CheckCmd, export::ExportCmd, inspect::InspectCmd, run::RunCmd, Session,
};

#[derive(Parser)]
#[command(
    name = "detector-sandbox",
    author,
    version,
    about = "Local host for diagnostic detectors",
    long_about = "Compile, validate, invoke, and export diagnostic detector manifests.\n\n\
                  Set RUST_LOG to control logging (default: warn)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Reference the manifest may use (repeatable; default: unrestricted)
    #[arg(long = "reference", global = true)]
    references: Vec<String>,

    /// Import the manifest may use (repeatable; default: unrestricted)
    #[arg(long = "import", global = true)]
    imports: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and validate a detector manifest
    Check(CheckCmd),

    /// Initialize a detector and invoke its entry point
    Run(RunCmd),

    /// Save a compiled detector artifact
    Export(ExportCmd),

    /// Load an exported artifact and show its metadata
    Inspect(InspectCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        json,
        verbose,
        references,
        imports,
    } = Cli::parse();

    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let session = Session::new(references, imports);

    match command {
        Commands::Check(cmd) => cmd.execute(&session, json).await,
        Commands::Run(cmd) => cmd.execute(&session, json).await,
        Commands::Export(cmd) => cmd.execute(&session, json).await,
        Commands::Inspect(cmd) => cmd.execute(&session, json).await,
    }
}
