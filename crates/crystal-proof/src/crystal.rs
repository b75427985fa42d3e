//! # Proof Crystal
//!
//! The sealed artifact produced by one crystallization. A crystal bundles the
//! reference run's event chain, the causality and determinism evidence, the
//! performance profile, every invariant outcome, and the verdict, and commits
//! to all of it with `crystalHash`.
//!
//! ## Security Invariant
//!
//! `crystalHash == hash_object(<every other field>)`. Fields are private and
//! only readable through accessors; the only constructor is the sealing path
//! used by the crystallizer, and deserialization of stored crystals. A
//! deserialized crystal is untrusted until [`verify_crystal`] accepts it.
//!
//! [`verify_crystal`]: crate::verify::verify_crystal

use serde::{Deserialize, Serialize};

use crystal_core::{hash_object, CanonicalizationError, CrystalError};
use crystal_crypto::EventNode;
use crystal_stats::StatisticalProfile;

use crate::causality::{CausalityMatrix, CausalityVerdict};
use crate::determinism::DeterminismFingerprint;
use crate::invariant::InvariantCheck;

/// Version of the crystal layout.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Binary outcome of a crystallization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Every check passed.
    Crystallized,
    /// At least one check failed; see the contamination reason.
    Contaminated,
}

impl Verdict {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crystallized => "CRYSTALLIZED",
            Self::Contaminated => "CONTAMINATED",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a crystal commits to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CrystalBody {
    pub(crate) crystal_id: String,
    pub(crate) protocol_version: String,
    pub(crate) crystallized_at: u64,
    pub(crate) scenario_name: String,
    pub(crate) description: String,
    pub(crate) tags: Vec<String>,
    pub(crate) merkle_nodes: Vec<EventNode>,
    pub(crate) merkle_root: String,
    pub(crate) causality_matrix: CausalityMatrix,
    pub(crate) causality_verdict: CausalityVerdict,
    pub(crate) determinism_fingerprint: DeterminismFingerprint,
    pub(crate) performance_profile: StatisticalProfile,
    pub(crate) invariants: Vec<InvariantCheck>,
    pub(crate) verdict: Verdict,
    pub(crate) contamination_reason: Option<String>,
}

/// A sealed, immutable crystallization artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofCrystal {
    #[serde(flatten)]
    body: CrystalBody,
    crystal_hash: String,
}

impl ProofCrystal {
    /// Seal `body` by hashing its canonical form.
    pub(crate) fn seal(body: CrystalBody) -> Result<Self, CanonicalizationError> {
        let crystal_hash = hash_object(&body)?;
        Ok(Self { body, crystal_hash })
    }

    /// Hash of every field except `crystalHash`, recomputed now.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError` if the content cannot be serialized.
    pub fn recompute_hash(&self) -> Result<String, CanonicalizationError> {
        hash_object(&self.body)
    }

    /// Parse a stored crystal.
    ///
    /// # Errors
    ///
    /// `CrystalError::Serialization` if `json` is not a crystal.
    pub fn from_json(json: &str) -> Result<Self, CrystalError> {
        serde_json::from_str(json).map_err(|e| CrystalError::Serialization(e.to_string()))
    }

    /// Render as pretty-printed JSON for storage.
    ///
    /// # Errors
    ///
    /// `CrystalError::Serialization` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, CrystalError> {
        serde_json::to_string_pretty(self).map_err(|e| CrystalError::Serialization(e.to_string()))
    }

    pub fn crystal_id(&self) -> &str {
        &self.body.crystal_id
    }

    pub fn protocol_version(&self) -> &str {
        &self.body.protocol_version
    }

    /// Clock reading (ms) when the crystal was sealed.
    pub fn crystallized_at(&self) -> u64 {
        self.body.crystallized_at
    }

    pub fn scenario_name(&self) -> &str {
        &self.body.scenario_name
    }

    pub fn description(&self) -> &str {
        &self.body.description
    }

    /// Default tags followed by scenario tags.
    pub fn tags(&self) -> &[String] {
        &self.body.tags
    }

    /// Event chain of the reference run.
    pub fn merkle_nodes(&self) -> &[EventNode] {
        &self.body.merkle_nodes
    }

    pub fn merkle_root(&self) -> &str {
        &self.body.merkle_root
    }

    pub fn causality_matrix(&self) -> &CausalityMatrix {
        &self.body.causality_matrix
    }

    pub fn causality_verdict(&self) -> &CausalityVerdict {
        &self.body.causality_verdict
    }

    pub fn determinism_fingerprint(&self) -> &DeterminismFingerprint {
        &self.body.determinism_fingerprint
    }

    /// Profile of the performance-run durations.
    pub fn performance_profile(&self) -> &StatisticalProfile {
        &self.body.performance_profile
    }

    /// Built-in, scenario, and result-validation checks, in evaluation order.
    pub fn invariants(&self) -> &[InvariantCheck] {
        &self.body.invariants
    }

    pub fn verdict(&self) -> Verdict {
        self.body.verdict
    }

    /// Why the crystal is contaminated; `None` when crystallized.
    pub fn contamination_reason(&self) -> Option<&str> {
        self.body.contamination_reason.as_deref()
    }

    pub fn crystal_hash(&self) -> &str {
        &self.crystal_hash
    }

    /// Whether the verdict is `CRYSTALLIZED`.
    pub fn is_crystallized(&self) -> bool {
        self.body.verdict == Verdict::Crystallized
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crystal_stats::profile;

    use crate::determinism::{prove, RunHashes};

    /// A small hand-assembled body with no chain.
    pub(crate) fn body() -> CrystalBody {
        let run = RunHashes {
            input_hash: "i".repeat(64),
            output_hash: "o".repeat(64),
            trace_hash: "t".repeat(64),
        };
        CrystalBody {
            crystal_id: "crystal-test-000000000000".to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            crystallized_at: 1_704_499_200_000,
            scenario_name: "fixture".to_string(),
            description: "hand-built".to_string(),
            tags: vec!["unit".to_string()],
            merkle_nodes: Vec::new(),
            merkle_root: crystal_crypto::compute_root(&[]),
            causality_matrix: CausalityMatrix::default(),
            causality_verdict: crate::causality::verify(&[], &CausalityMatrix::default()),
            determinism_fingerprint: prove(&[run.clone(), run]),
            performance_profile: profile(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(),
            invariants: Vec::new(),
            verdict: Verdict::Crystallized,
            contamination_reason: None,
        }
    }
}
