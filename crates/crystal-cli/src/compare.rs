//! # Compare Subcommand
//!
//! Mann-Whitney U comparison of two duration samples, e.g. the same
//! scenario measured on two builds.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crystal_stats::mann_whitney_u_detailed;

use crate::input::load_samples;

/// Arguments for the compare subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Baseline sample array.
    pub baseline: PathBuf,

    /// Candidate sample array.
    pub candidate: PathBuf,

    /// Significance level.
    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,
}

/// Compare and report. Returns whether the difference is significant.
pub fn run(args: &CompareArgs, out: &mut dyn Write) -> anyhow::Result<bool> {
    anyhow::ensure!(
        args.alpha > 0.0 && args.alpha < 1.0,
        "alpha must be in (0, 1), got {}",
        args.alpha
    );
    let baseline = load_samples(&args.baseline)?;
    let candidate = load_samples(&args.candidate)?;
    let result = mann_whitney_u_detailed(&baseline, &candidate)?;
    let significant = result.significant(args.alpha);

    writeln!(out, "n1 = {}, n2 = {}", baseline.len(), candidate.len())?;
    writeln!(out, "U  = {}", result.u)?;
    writeln!(out, "z  = {:.4}", result.z)?;
    writeln!(out, "p  = {:.6}", result.p_value)?;
    writeln!(
        out,
        "{} at alpha = {}",
        if significant { "significant" } else { "not significant" },
        args.alpha
    )?;
    Ok(significant)
}
