//! # Invariant Evaluation
//!
//! Named boolean predicates over the reference run's result and event trace.
//!
//! ## Isolation
//!
//! Every check is evaluated on its own behind [`std::panic::catch_unwind`].
//! A check that returns `Err` or panics is recorded as `FAIL` with
//! `"Exception: <message>"` as evidence; the remaining checks still run and
//! crystallization is never aborted by an invariant.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crystal_core::{EventType, TraceRecord};

use crate::dispatch::outcome;

/// Id of the invariant built from a scenario's result validator.
pub const RESULT_VALIDATION_ID: &str = "INV-CUSTOM-RESULT";

/// Error raised from inside an invariant check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InvariantError {
    message: String,
}

impl InvariantError {
    /// An error carrying `message` verbatim into the evidence.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for InvariantError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for InvariantError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvariantStatus {
    /// The predicate held.
    Pass,
    /// The predicate did not hold, returned an error, or panicked.
    Fail,
}

impl InvariantStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for InvariantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recorded outcome of one invariant, as stored in a crystal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvariantCheck {
    /// Stable identifier, e.g. `INV-E2E-01`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Pass or fail.
    pub status: InvariantStatus,
    /// Short evidence string.
    pub evidence: String,
}

impl InvariantCheck {
    /// Whether this check failed.
    pub fn failed(&self) -> bool {
        self.status == InvariantStatus::Fail
    }
}

type CheckFn = dyn Fn(&Value, &[TraceRecord]) -> Result<bool, InvariantError> + Send + Sync;

#[derive(Debug, Clone, Copy)]
enum Evidence {
    Check,
    Validation,
}

impl Evidence {
    fn text(self, pass: bool) -> &'static str {
        match (self, pass) {
            (Self::Check, true) => "Check passed",
            (Self::Check, false) => "Check failed",
            (Self::Validation, true) => "Validation passed",
            (Self::Validation, false) => "Validation failed",
        }
    }
}

/// A named predicate over `(result, trace)`.
pub struct Invariant {
    id: String,
    name: String,
    evidence: Evidence,
    check: Box<CheckFn>,
}

impl Invariant {
    /// An infallible check.
    pub fn new<F>(id: impl Into<String>, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &[TraceRecord]) -> bool + Send + Sync + 'static,
    {
        Self::fallible(id, name, move |result, trace| Ok(check(result, trace)))
    }

    /// A check that may fail with an [`InvariantError`].
    pub fn fallible<F>(id: impl Into<String>, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value, &[TraceRecord]) -> Result<bool, InvariantError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            evidence: Evidence::Check,
            check: Box::new(check),
        }
    }

    /// Wrap a scenario's result validator as `INV-CUSTOM-RESULT`.
    pub fn result_validation<F>(validate: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, InvariantError> + Send + Sync + 'static,
    {
        Self {
            id: RESULT_VALIDATION_ID.to_string(),
            name: "Custom result validation".to_string(),
            evidence: Evidence::Validation,
            check: Box::new(move |result, _| validate(result)),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the check in isolation and record the outcome.
    pub fn evaluate(&self, result: &Value, trace: &[TraceRecord]) -> InvariantCheck {
        let outcome = catch_unwind(AssertUnwindSafe(|| (self.check)(result, trace)));
        let (status, evidence) = match outcome {
            Ok(Ok(pass)) => (
                if pass {
                    InvariantStatus::Pass
                } else {
                    InvariantStatus::Fail
                },
                self.evidence.text(pass).to_string(),
            ),
            Ok(Err(e)) => {
                tracing::warn!(invariant = %self.id, error = %e, "invariant check returned an error");
                (InvariantStatus::Fail, format!("Exception: {e}"))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(invariant = %self.id, panic = %message, "invariant check panicked");
                (InvariantStatus::Fail, format!("Exception: {message}"))
            }
        };
        InvariantCheck {
            id: self.id.clone(),
            name: self.name.clone(),
            status,
            evidence,
        }
    }
}

impl std::fmt::Debug for Invariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invariant")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "invariant check panicked".to_string()
    }
}

/// The checks applied to every scenario before its own.
///
/// - `INV-E2E-01`: the trace contains the start event.
/// - `INV-E2E-02`: the trace contains at least one terminal event.
/// - `INV-E2E-03`: the result is a tagged `ok`/`error` union.
pub fn builtin_invariants() -> Vec<Invariant> {
    vec![
        Invariant::new("INV-E2E-01", "Trace has start event", |_, trace| {
            trace.iter().any(|r| r.kind() == Some(EventType::start()))
        }),
        Invariant::new("INV-E2E-02", "Trace has terminal event", |_, trace| {
            trace
                .iter()
                .any(|r| r.kind().is_some_and(|k| k.is_terminal()))
        }),
        Invariant::new("INV-E2E-03", "Result is typed (ok or error)", |result, _| {
            outcome::is_typed(result)
        }),
    ]
}
