//! # Offline Crystal Verification
//!
//! Re-checks a stored crystal without executing anything. Every integrity
//! problem is reported as an entry in [`CrystalVerification::errors`];
//! [`verify_crystal`] never fails and never panics.

use serde::{Deserialize, Serialize};

use crystal_crypto::{compute_root, verify_links, LinkBreak};

use crate::crystal::{ProofCrystal, Verdict};

/// Outcome of [`verify_crystal`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrystalVerification {
    /// No errors and the verdict is `CRYSTALLIZED`.
    pub valid: bool,
    /// Every problem found, in check order.
    pub errors: Vec<String>,
}

/// Verify `crystal`'s seal, chain, and recorded evidence.
///
/// Checks, in order: `crystalHash`, `merkleRoot`, each node's parent link
/// and own hash, causality, determinism, and failed invariants.
pub fn verify_crystal(crystal: &ProofCrystal) -> CrystalVerification {
    let mut errors = Vec::new();

    match crystal.recompute_hash() {
        Ok(actual) if actual == crystal.crystal_hash() => {}
        Ok(actual) => errors.push(format!(
            "Crystal hash mismatch: expected {}, got {actual}",
            crystal.crystal_hash()
        )),
        Err(e) => errors.push(format!("Crystal hash could not be recomputed: {e}")),
    }

    let root = compute_root(crystal.merkle_nodes());
    if root != crystal.merkle_root() {
        errors.push(format!(
            "Merkle root mismatch: expected {}, got {root}",
            crystal.merkle_root()
        ));
    }

    for broken in verify_links(crystal.merkle_nodes()) {
        errors.push(match broken {
            LinkBreak::Parent { index } => format!("Node {index} parent hash mismatch"),
            LinkBreak::Content { index } => format!("Node {index} hash mismatch"),
        });
    }

    let causality = crystal.causality_verdict();
    if !causality.valid {
        errors.push(format!("Causality violations: {}", causality.violations.len()));
    }

    if !crystal.determinism_fingerprint().proven {
        errors.push("Determinism not proven".to_string());
    }

    let failed: Vec<&str> = crystal
        .invariants()
        .iter()
        .filter(|c| c.failed())
        .map(|c| c.id.as_str())
        .collect();
    if !failed.is_empty() {
        errors.push(format!("Failed invariants: {}", failed.join(", ")));
    }

    if !errors.is_empty() {
        tracing::warn!(
            crystal_id = %crystal.crystal_id(),
            errors = errors.len(),
            first = %errors[0],
            "crystal failed verification"
        );
    }

    CrystalVerification {
        valid: errors.is_empty() && crystal.verdict() == Verdict::Crystallized,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crystal::fixtures;
    use crate::invariant::{InvariantCheck, InvariantStatus};

    fn seal(body: crate::crystal::CrystalBody) -> ProofCrystal {
        ProofCrystal::seal(body).unwrap()
    }

    #[test]
    fn test_clean_fixture_is_valid() {
        let v = verify_crystal(&seal(fixtures::body()));
        assert_eq!(v.errors, Vec::<String>::new());
        assert!(v.valid);
    }

    #[test]
    fn test_contaminated_without_errors_is_not_valid() {
        let mut body = fixtures::body();
        body.verdict = Verdict::Contaminated;
        body.contamination_reason = Some("Execution failed".into());
        let v = verify_crystal(&seal(body));
        assert!(v.errors.is_empty());
        assert!(!v.valid);
    }

    #[test]
    fn test_recorded_failures_are_surfaced() {
        let mut body = fixtures::body();
        body.determinism_fingerprint.proven = false;
        body.invariants = ["INV-A", "INV-B"]
            .iter()
            .map(|id| InvariantCheck {
                id: (*id).to_string(),
                name: String::new(),
                status: InvariantStatus::Fail,
                evidence: "Check failed".into(),
            })
            .collect();
        let v = verify_crystal(&seal(body));
        assert_eq!(
            v.errors,
            vec![
                "Determinism not proven".to_string(),
                "Failed invariants: INV-A, INV-B".to_string(),
            ]
        );
        assert!(!v.valid);
    }

    #[test]
    fn test_tampered_field_reports_hash_mismatch() {
        let crystal = seal(fixtures::body());
        let mut json = serde_json::to_value(&crystal).unwrap();
        json["performanceProfile"]["p50"] = serde_json::json!(4.0);
        let tampered: ProofCrystal = serde_json::from_value(json).unwrap();
        let v = verify_crystal(&tampered);
        assert!(!v.valid);
        assert_eq!(v.errors.len(), 1);
        assert!(v.errors[0].starts_with("Crystal hash mismatch: expected "));
    }

    #[test]
    fn test_wrong_root_reported() {
        let mut body = fixtures::body();
        body.merkle_root = "0".repeat(64);
        let v = verify_crystal(&seal(body));
        assert_eq!(v.errors.len(), 1);
        assert!(v.errors[0].starts_with("Merkle root mismatch: expected 0000"));
    }
}
