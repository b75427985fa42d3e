//! # Verify Subcommand
//!
//! Offline verification of a stored crystal. Exits non-zero when the crystal
//! is invalid.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crystal_proof::verify_crystal;

use crate::input::load_crystal;

/// Arguments for the verify subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the crystal JSON file.
    pub crystal: PathBuf,

    /// Print the verification result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Verify and report. Returns whether the crystal is valid.
pub fn run(args: &VerifyArgs, out: &mut dyn Write) -> anyhow::Result<bool> {
    let crystal = load_crystal(&args.crystal)?;
    let verification = verify_crystal(&crystal);

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&verification)?)?;
    } else {
        let label = if verification.valid { "VALID" } else { "INVALID" };
        writeln!(out, "{label} {} ({})", crystal.crystal_id(), crystal.verdict())?;
        if let Some(reason) = crystal.contamination_reason() {
            writeln!(out, "  reason: {reason}")?;
        }
        for error in &verification.errors {
            writeln!(out, "  - {error}")?;
        }
    }

    tracing::debug!(crystal_id = %crystal.crystal_id(), valid = verification.valid, "verified");
    Ok(verification.valid)
}
