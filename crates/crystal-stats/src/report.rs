//! # Markdown Stats Report
//!
//! Renders one or more named profiles as a GitHub-flavoured markdown table.
//! Presentation only; nothing here feeds back into a crystal hash.

use std::fmt::Write as _;

use crate::profile::StatisticalProfile;

const HEADER: &str = "| Scenario | n | mean (ms) | p50 | p95 | p99 | p99.9 | stddev | cv | distribution | outliers |";
const RULE: &str = "|---|---:|---:|---:|---:|---:|---:|---:|---:|---|---:|";

/// Render `rows` as a markdown table, one row per `(name, profile)`.
pub fn markdown_table(rows: &[(&str, &StatisticalProfile)]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');
    for (name, p) in rows {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "| {} | {} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} | {} | {} |",
            name.replace('|', "\\|"),
            p.n,
            p.mean,
            p.p50,
            p.p95,
            p.p99,
            p.p999,
            p.stddev,
            p.cv,
            p.distribution,
            p.outliers.len(),
        );
    }
    out
}
