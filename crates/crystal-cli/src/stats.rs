//! # Stats Subcommand
//!
//! Renders a markdown table of performance profiles. Each input file is
//! either a JSON array of durations or a stored crystal, whose
//! `performanceProfile` is used as-is.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crystal_stats::markdown_table;

use crate::input::{display_name, load_profile};

/// Arguments for the stats subcommand.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Sample arrays or crystal files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: &StatsArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut named = Vec::with_capacity(args.files.len());
    for path in &args.files {
        named.push((display_name(path), load_profile(path)?));
    }
    let rows: Vec<(&str, &_)> = named.iter().map(|(n, p)| (n.as_str(), p)).collect();
    write!(out, "{}", markdown_table(&rows))?;
    Ok(())
}
