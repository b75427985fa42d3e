//! # crystal CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

/// Proof crystal toolchain.
///
/// Verifies, inspects, and compares crystals and duration samples without
/// re-executing any scenario.
#[derive(Parser, Debug)]
#[command(name = "crystal", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Verify a stored crystal offline.
    Verify(crystal_cli::verify::VerifyArgs),
    /// Print a stored crystal.
    Inspect(crystal_cli::inspect::InspectArgs),
    /// Markdown table of performance profiles.
    Stats(crystal_cli::stats::StatsArgs),
    /// Mann-Whitney U comparison of two sample files.
    Compare(crystal_cli::compare::CompareArgs),
}

fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<ExitCode> {
    let ok = match &cli.command {
        Commands::Verify(args) => crystal_cli::verify::run(args, out)?,
        Commands::Inspect(args) => {
            crystal_cli::inspect::run(args, out)?;
            true
        }
        Commands::Stats(args) => {
            crystal_cli::stats::run(args, out)?;
            true
        }
        // Significance does not affect the exit status.
        Commands::Compare(args) => {
            crystal_cli::compare::run(args, out)?;
            true
        }
    };
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&cli, &mut out)
}
