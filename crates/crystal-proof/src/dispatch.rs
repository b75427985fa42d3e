//! # Dispatcher Boundary
//!
//! The crystallizer never routes envelopes itself. It asks a
//! [`HandlerRegistry`] for a fresh [`Dispatcher`] before every run, sends
//! exactly one envelope through it, and then reads back the result and the
//! event trace the dispatcher recorded along the way.
//!
//! ## Security Invariant
//!
//! A dispatcher is built per run and dropped after it. Its trace and replay
//! store therefore never leak into the next run, so a replay rejection in run
//! `k + 1` can only come from the envelope itself and never from run `k`.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crystal_core::{Clock, TraceRecord};

/// A message handed to a dispatcher.
///
/// Envelopes are opaque to the crystallizer; they are only canonicalized and
/// hashed (`inputHash`) and passed through.
pub type Envelope = Value;

/// Failure to execute a run at all.
///
/// This is distinct from a handler returning `{"ok": false, ...}`, which is
/// an ordinary result and flows into the crystal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The dispatcher could not process the envelope.
    #[error("dispatch failed: {0}")]
    Failed(String),
    /// The envelope was not a shape the dispatcher can route.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}

/// Routes one envelope to a handler and records what happened.
pub trait Dispatcher {
    /// Dispatch `envelope` and return the handler result.
    ///
    /// The result is expected to be an [`outcome`] tagged union.
    fn dispatch(&mut self, envelope: &Envelope) -> Result<Value, DispatchError>;

    /// Every trace record emitted so far, in emission order.
    fn trace(&self) -> Vec<TraceRecord>;
}

/// Factory of isolated dispatchers.
///
/// Implementations hold the handler table; each call to
/// [`dispatcher`](HandlerRegistry::dispatcher) must return a dispatcher with
/// an empty trace and an empty replay store.
pub trait HandlerRegistry: Send + Sync {
    /// The dispatcher type produced by this registry.
    type Dispatcher: Dispatcher;

    /// Build a fresh dispatcher that reads time from `clock`.
    fn dispatcher(&self, clock: Arc<dyn Clock>) -> Self::Dispatcher;
}

/// Helpers for the `{"ok": true, "value": ...}` / `{"ok": false, "error": ...}`
/// result convention.
pub mod outcome {
    use serde_json::{json, Value};

    /// A successful result wrapping `value`.
    pub fn ok(value: impl Into<Value>) -> Value {
        json!({ "ok": true, "value": value.into() })
    }

    /// A failed result wrapping `error`.
    pub fn err(error: impl Into<Value>) -> Value {
        json!({ "ok": false, "error": error.into() })
    }

    /// Whether `result` is an object carrying a boolean `ok` field.
    pub fn is_typed(result: &Value) -> bool {
        matches!(result.get("ok"), Some(Value::Bool(_)))
    }

    /// Whether `result` reports success.
    pub fn is_ok(result: &Value) -> bool {
        result.get("ok") == Some(&Value::Bool(true))
    }

    /// Whether `result` reports failure. Untyped results count as failures.
    pub fn is_err(result: &Value) -> bool {
        !is_ok(result)
    }

    /// The success payload, if any.
    pub fn value(result: &Value) -> Option<&Value> {
        if is_ok(result) {
            result.get("value")
        } else {
            None
        }
    }

    /// The error payload, if any.
    pub fn error(result: &Value) -> Option<&Value> {
        if is_ok(result) {
            None
        } else {
            result.get("error")
        }
    }
}
