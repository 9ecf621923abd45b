//! AWE CLI
//!
//! Command-line tool that computes Agricultural Water Efficiency from the
//! AQUASTAT tables in a directory.

use awe_core::{run_and_report, RunConfig, RunOutcome};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "awe-cli")]
#[command(about = "Agricultural Water Efficiency from AQUASTAT tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory containing the input CSV tables
    #[arg(default_value = ".")]
    dir: PathBuf,
}

fn main() {
    // Logs go to stderr so they never mix with the report on stdout.
    // Set RUST_LOG=debug for per-file detail.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> awe_core::Result<()> {
    let cli = Cli::parse();
    let config = RunConfig::default();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run_and_report(&cli.dir, &config, &mut out)?;
    out.flush()?;

    match &result.outcome {
        RunOutcome::WithOutput { path, rows } => {
            debug!(path = %path.display(), rows, "run finished with results");
        }
        RunOutcome::WithoutOutput => debug!("run finished without results"),
        RunOutcome::NoInputFiles => debug!("run finished with no input"),
    }

    Ok(())
}
