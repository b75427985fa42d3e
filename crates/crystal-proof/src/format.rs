//! Human-readable rendering of a crystal for terminals and logs.
//!
//! Presentation only. Nothing here is covered by `crystalHash`.

use crate::crystal::ProofCrystal;
use crate::invariant::InvariantStatus;

const WIDTH: usize = 76;

fn rule(left: char, right: char) -> String {
    format!("{left}{}{right}", "─".repeat(WIDTH + 2))
}

fn row(text: &str) -> String {
    let clipped: String = text.chars().take(WIDTH).collect();
    let pad = WIDTH - clipped.chars().count();
    format!("│ {clipped}{} │", " ".repeat(pad))
}

fn short(hash: &str) -> &str {
    hash.get(..40).unwrap_or(hash)
}

/// Render `crystal` as a boxed summary.
pub fn format_crystal(crystal: &ProofCrystal) -> String {
    let perf = crystal.performance_profile();
    let det = crystal.determinism_fingerprint();

    let mut lines = vec![
        rule('┌', '┐'),
        row(&format!("PROOF CRYSTAL: {}", crystal.scenario_name())),
        rule('├', '┤'),
        row(&format!("ID:           {}", crystal.crystal_id())),
        row(&format!("Protocol:     {}", crystal.protocol_version())),
        row(&format!("Verdict:      {}", crystal.verdict())),
    ];
    if let Some(reason) = crystal.contamination_reason() {
        lines.push(row(&format!("Reason:       {reason}")));
    }
    lines.extend([
        rule('├', '┤'),
        row(&format!("Merkle Root:  {}", short(crystal.merkle_root()))),
        row(&format!("Crystal Hash: {}", short(crystal.crystal_hash()))),
        rule('├', '┤'),
        row("PERFORMANCE"),
        row(&format!("  p50:  {:>10.3} ms", perf.p50)),
        row(&format!("  p95:  {:>10.3} ms", perf.p95)),
        row(&format!("  p99:  {:>10.3} ms", perf.p99)),
        row(&format!("  p999: {:>10.3} ms", perf.p999)),
        row(&format!("  Distribution: {}", perf.distribution)),
        rule('├', '┤'),
        row("INVARIANTS"),
    ]);
    for check in crystal.invariants() {
        let mark = match check.status {
            InvariantStatus::Pass => "[PASS]",
            InvariantStatus::Fail => "[FAIL]",
        };
        lines.push(row(&format!("  {mark} {}: {}", check.id, check.name)));
    }
    lines.extend([
        rule('├', '┤'),
        row(&format!(
            "Causality Score: {:.1}%",
            crystal.causality_verdict().score * 100.0
        )),
        row(&format!(
            "Determinism: {} ({} identical runs)",
            if det.proven { "PROVEN" } else { "NOT PROVEN" },
            det.identical_runs
        )),
        rule('└', '┘'),
    ]);

    lines.join("\n")
}
