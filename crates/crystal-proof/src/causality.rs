//! # Causality Verification
//!
//! Builds a precedence matrix over the nodes of an event chain from the
//! static dependency table on [`EventType`], then checks every constraint
//! against the node timestamps.
//!
//! `matrix[i][j] == true` means node `i` must not be timestamped after node
//! `j`. Only pairs with `i < j` are ever set by [`build_matrix`]. Event type
//! names outside the table have no dependencies.
//!
//! Both operations are pure. [`verify`] never rewrites the matrix it is given.

use serde::{Deserialize, Serialize};

use crystal_core::EventType;
use crystal_crypto::EventNode;

/// Square precedence matrix over chain positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CausalityMatrix(Vec<Vec<bool>>);

impl CausalityMatrix {
    /// Wrap raw rows.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        Self(rows)
    }

    /// The raw rows.
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.0
    }

    /// Whether position `i` must precede position `j`. Out-of-range is `false`.
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.0.get(i).and_then(|row| row.get(j)).copied().unwrap_or(false)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every `(i, j)` set to `true`, row-major.
    pub fn constraints(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, set)| **set)
                .map(move |(j, _)| (i, j))
        })
    }
}

/// One broken precedence constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Position that should have come first.
    pub before: usize,
    /// Position that should have come later.
    pub after: usize,
    /// Human-readable description naming both events and timestamps.
    pub reason: String,
}

/// Result of checking a chain against its matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CausalityVerdict {
    /// `true` iff there are no violations.
    pub valid: bool,
    /// Every violated constraint, row-major.
    pub violations: Vec<Violation>,
    /// `(constraints - violations) / constraints`, `1.0` with no constraints.
    pub score: f64,
}

fn depends_on(later: &str, earlier: &str) -> bool {
    match (later.parse::<EventType>(), earlier.parse::<EventType>()) {
        (Ok(later), Ok(earlier)) => earlier.must_precede(later),
        _ => false,
    }
}

/// Build the precedence matrix for `nodes`.
pub fn build_matrix(nodes: &[EventNode]) -> CausalityMatrix {
    let n = nodes.len();
    let mut rows = vec![vec![false; n]; n];
    for (j, later) in nodes.iter().enumerate() {
        for (i, earlier) in nodes[..j].iter().enumerate() {
            if depends_on(&later.event_type, &earlier.event_type) {
                rows[i][j] = true;
            }
        }
    }
    CausalityMatrix(rows)
}

/// Check every constraint of `matrix` against the timestamps of `nodes`.
///
/// Constraints that point outside `nodes` are ignored; they neither count
/// toward the score nor produce violations.
pub fn verify(nodes: &[EventNode], matrix: &CausalityMatrix) -> CausalityVerdict {
    let mut constraints = 0usize;
    let mut violations = Vec::new();

    for (i, j) in matrix.constraints() {
        let (Some(first), Some(second)) = (nodes.get(i), nodes.get(j)) else {
            continue;
        };
        constraints += 1;
        if first.timestamp > second.timestamp {
            violations.push(Violation {
                before: i,
                after: j,
                reason: format!(
                    "{} (t={}) should precede {} (t={})",
                    first.event_type, first.timestamp, second.event_type, second.timestamp
                ),
            });
        }
    }

    let score = if constraints == 0 {
        1.0
    } else {
        (constraints - violations.len()) as f64 / constraints as f64
    };

    CausalityVerdict {
        valid: violations.is_empty(),
        violations,
        score,
    }
}
