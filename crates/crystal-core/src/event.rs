//! # Dispatch Events — Single Source of Truth
//!
//! Defines `EventType`, the closed set of events a dispatch pipeline records
//! in its trace, together with the static causal dependency table. Every
//! `match` on `EventType` is exhaustive, so adding an event forces its
//! dependencies to be declared at compile time.
//!
//! Trace records themselves stay loosely typed ([`TraceRecord`]): the event
//! type is kept as the string the dispatcher emitted, so unknown events from
//! a newer pipeline still hash and chain correctly. They simply carry no
//! causal constraints.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CrystalError;

/// All event types a dispatch pipeline records.
///
/// | Event | Must be preceded by |
/// |-------|---------------------|
/// | `DISPATCH_RECEIVED` | — |
/// | `VALIDATION_OK` / `VALIDATION_FAILED` | `DISPATCH_RECEIVED` |
/// | `POLICY_OK` / `POLICY_REJECTED` | `VALIDATION_OK` |
/// | `REPLAY_OK` / `REPLAY_REJECTED` | `POLICY_OK`, `VALIDATION_OK` |
/// | `HANDLER_RESOLVED` / `HANDLER_NOT_FOUND` | `REPLAY_OK`, `POLICY_OK` |
/// | `EXECUTION_START` | `HANDLER_RESOLVED` |
/// | `EXECUTION_OK` / `EXECUTION_ERROR` | `EXECUTION_START` |
/// | `DISPATCH_COMPLETE` | any outcome event |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// The envelope entered the pipeline.
    DispatchReceived,
    /// Envelope passed schema validation.
    ValidationOk,
    /// Envelope failed schema validation.
    ValidationFailed,
    /// Policy gate admitted the envelope.
    PolicyOk,
    /// Policy gate rejected the envelope.
    PolicyRejected,
    /// Replay guard admitted the replay key.
    ReplayOk,
    /// Replay guard rejected a reused replay key.
    ReplayRejected,
    /// A handler was found for the target module.
    HandlerResolved,
    /// No handler is registered for the target module.
    HandlerNotFound,
    /// The handler started executing.
    ExecutionStart,
    /// The handler returned successfully.
    ExecutionOk,
    /// The handler returned an error.
    ExecutionError,
    /// The dispatch finished.
    DispatchComplete,
}

/// Total number of event types.
pub const EVENT_TYPE_COUNT: usize = 13;

impl EventType {
    /// Returns all event types in pipeline order.
    pub fn all() -> &'static [EventType] {
        &[
            Self::DispatchReceived,
            Self::ValidationOk,
            Self::ValidationFailed,
            Self::PolicyOk,
            Self::PolicyRejected,
            Self::ReplayOk,
            Self::ReplayRejected,
            Self::HandlerResolved,
            Self::HandlerNotFound,
            Self::ExecutionStart,
            Self::ExecutionOk,
            Self::ExecutionError,
            Self::DispatchComplete,
        ]
    }

    /// The wire name recorded in traces.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DispatchReceived => "DISPATCH_RECEIVED",
            Self::ValidationOk => "VALIDATION_OK",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::PolicyOk => "POLICY_OK",
            Self::PolicyRejected => "POLICY_REJECTED",
            Self::ReplayOk => "REPLAY_OK",
            Self::ReplayRejected => "REPLAY_REJECTED",
            Self::HandlerResolved => "HANDLER_RESOLVED",
            Self::HandlerNotFound => "HANDLER_NOT_FOUND",
            Self::ExecutionStart => "EXECUTION_START",
            Self::ExecutionOk => "EXECUTION_OK",
            Self::ExecutionError => "EXECUTION_ERROR",
            Self::DispatchComplete => "DISPATCH_COMPLETE",
        }
    }

    /// Event types that must occur before this one.
    pub fn depends_on(&self) -> &'static [EventType] {
        match self {
            Self::DispatchReceived => &[],
            Self::ValidationOk | Self::ValidationFailed => &[Self::DispatchReceived],
            Self::PolicyOk | Self::PolicyRejected => &[Self::ValidationOk],
            Self::ReplayOk | Self::ReplayRejected => &[Self::PolicyOk, Self::ValidationOk],
            Self::HandlerResolved | Self::HandlerNotFound => &[Self::ReplayOk, Self::PolicyOk],
            Self::ExecutionStart => &[Self::HandlerResolved],
            Self::ExecutionOk | Self::ExecutionError => &[Self::ExecutionStart],
            Self::DispatchComplete => &[
                Self::ExecutionOk,
                Self::ExecutionError,
                Self::PolicyRejected,
                Self::ValidationFailed,
                Self::HandlerNotFound,
                Self::ReplayRejected,
            ],
        }
    }

    /// Whether `self` must precede `later`.
    pub fn must_precede(&self, later: EventType) -> bool {
        later.depends_on().contains(self)
    }

    /// The event that opens every dispatch trace.
    pub fn start() -> EventType {
        Self::DispatchReceived
    }

    /// Whether a trace ending in this event counts as terminated.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::DispatchComplete
                | Self::ValidationFailed
                | Self::PolicyRejected
                | Self::ReplayRejected
        )
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CrystalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| CrystalError::UnknownEventType(s.to_string()))
    }
}

/// One record of a dispatcher's event trace.
///
/// Serializes flat: `{"event_type": "...", ...fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Wire name of the event.
    pub event_type: String,
    /// Remaining record fields (ids, timestamps, hashes).
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl TraceRecord {
    /// A record with no extra fields.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The typed event, if the name is in the table.
    pub fn kind(&self) -> Option<EventType> {
        self.event_type.parse().ok()
    }
}

impl From<EventType> for TraceRecord {
    fn from(event: EventType) -> Self {
        Self::new(event.as_str())
    }
}
