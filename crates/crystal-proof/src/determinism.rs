//! # Determinism Prover
//!
//! Compares output digests across repeated runs of the same scenario.
//!
//! Only `outputHash` equality is checked. Envelopes are allowed to differ
//! between runs in administrative fields (message ids, timestamps), so input
//! and trace hashes are carried for the record but never compared.

use serde::{Deserialize, Serialize};

/// The three digests captured for one determinism run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHashes {
    /// Hash of the canonical envelope.
    pub input_hash: String,
    /// Hash of the canonical result.
    pub output_hash: String,
    /// Hash of the canonical event trace.
    pub trace_hash: String,
}

/// Summary of a batch of determinism runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeterminismFingerprint {
    /// Input hash of the first run.
    pub input_hash: String,
    /// Output hash of the first run.
    pub output_hash: String,
    /// Trace hash of the first run.
    pub trace_hash: String,
    /// Runs whose output hash equals the first run's.
    pub identical_runs: u32,
    /// `identical_runs == total && total >= 2`.
    pub proven: bool,
}

/// Fold per-run digests into a fingerprint.
///
/// An empty slice gives empty hashes, zero identical runs, and `proven = false`.
/// A single run is never proven regardless of its hashes.
pub fn prove(runs: &[RunHashes]) -> DeterminismFingerprint {
    let Some(reference) = runs.first() else {
        return DeterminismFingerprint {
            input_hash: String::new(),
            output_hash: String::new(),
            trace_hash: String::new(),
            identical_runs: 0,
            proven: false,
        };
    };

    let identical = runs
        .iter()
        .filter(|r| r.output_hash == reference.output_hash)
        .count();

    DeterminismFingerprint {
        input_hash: reference.input_hash.clone(),
        output_hash: reference.output_hash.clone(),
        trace_hash: reference.trace_hash.clone(),
        identical_runs: u32::try_from(identical).unwrap_or(u32::MAX),
        proven: identical == runs.len() && runs.len() >= 2,
    }
}
