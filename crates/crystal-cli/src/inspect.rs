//! # Inspect Subcommand
//!
//! Prints a stored crystal in human-readable form.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crystal_proof::format_crystal;

use crate::input::load_crystal;

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the crystal JSON file.
    pub crystal: PathBuf,

    /// Also list every chained event.
    #[arg(long)]
    pub events: bool,
}

pub fn run(args: &InspectArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let crystal = load_crystal(&args.crystal)?;
    writeln!(out, "{}", format_crystal(&crystal))?;

    if args.events {
        writeln!(out)?;
        for node in crystal.merkle_nodes() {
            writeln!(
                out,
                "{:>4}  {:>15}  {:<20}  {}",
                node.index,
                node.timestamp,
                node.event_type,
                node.hash.get(..16).unwrap_or(&node.hash)
            )?;
        }
    }
    Ok(())
}
