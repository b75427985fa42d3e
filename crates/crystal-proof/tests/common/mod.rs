//! Fixture dispatcher that walks the full dispatch pipeline
//! (validation, policy, replay, handler resolution, execution) and records
//! one trace event per stage.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use crystal_core::{Clock, EventType, TraceRecord};
use crystal_proof::{outcome, DispatchError, Dispatcher, Envelope, HandlerRegistry};

/// Epoch used by every fixed-clock test (2024-01-06T00:00:00Z).
pub const EPOCH_MS: u64 = 1_704_499_200_000;

type Handler = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Module name whose envelopes make the dispatcher itself fail.
pub const OFFLINE_MODULE: &str = "offline";

#[derive(Clone, Default)]
pub struct PipelineRegistry {
    handlers: HashMap<String, Handler>,
    denied: HashSet<String>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler<F>(mut self, module: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.handlers.insert(module.to_string(), Arc::new(f));
        self
    }

    pub fn deny(mut self, module: &str) -> Self {
        self.denied.insert(module.to_string());
        self
    }

    /// Registry with a `ping` module answering `{"pong": true}`.
    pub fn ping() -> Self {
        Self::new().handler("ping", |_| Ok(json!({"pong": true})))
    }

    /// Registry whose `counter` module returns a different value every call.
    pub fn counter() -> Self {
        let calls = Arc::new(AtomicU64::new(0));
        Self::new().handler("counter", move |_| {
            Ok(json!({"call": calls.fetch_add(1, Ordering::SeqCst)}))
        })
    }
}

impl HandlerRegistry for PipelineRegistry {
    type Dispatcher = PipelineDispatcher;

    fn dispatcher(&self, clock: Arc<dyn Clock>) -> PipelineDispatcher {
        PipelineDispatcher {
            registry: self.clone(),
            clock,
            trace: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

pub struct PipelineDispatcher {
    registry: PipelineRegistry,
    clock: Arc<dyn Clock>,
    trace: Vec<TraceRecord>,
    seen: HashSet<String>,
}

impl PipelineDispatcher {
    fn emit(&mut self, event: EventType, message_id: &str) {
        let record = TraceRecord::from(event)
            .with_field("message_id", message_id)
            .with_field("timestamp", self.clock.now_ms());
        self.trace.push(record);
    }

    fn reject(&mut self, event: EventType, message_id: &str, error: &str) -> Value {
        self.emit(event, message_id);
        self.emit(EventType::DispatchComplete, message_id);
        outcome::err(error)
    }
}

impl Dispatcher for PipelineDispatcher {
    fn dispatch(&mut self, envelope: &Envelope) -> Result<Value, DispatchError> {
        let message_id = envelope
            .get("message_id")
            .and_then(Value::as_str)
            .unwrap_or("anonymous")
            .to_string();
        self.emit(EventType::DispatchReceived, &message_id);

        let target = envelope.get("target_module").and_then(Value::as_str);
        let (Some(target), Some(payload)) = (target, envelope.get("payload")) else {
            return Ok(self.reject(EventType::ValidationFailed, &message_id, "invalid envelope"));
        };
        if target == OFFLINE_MODULE {
            return Err(DispatchError::Failed(format!("module {target} is offline")));
        }
        self.emit(EventType::ValidationOk, &message_id);

        if self.registry.denied.contains(target) {
            return Ok(self.reject(EventType::PolicyRejected, &message_id, "policy"));
        }
        self.emit(EventType::PolicyOk, &message_id);

        if !self.seen.insert(message_id.clone()) {
            return Ok(self.reject(EventType::ReplayRejected, &message_id, "replay"));
        }
        self.emit(EventType::ReplayOk, &message_id);

        let Some(handler) = self.registry.handlers.get(target).cloned() else {
            return Ok(self.reject(EventType::HandlerNotFound, &message_id, "no handler"));
        };
        self.emit(EventType::HandlerResolved, &message_id);

        self.emit(EventType::ExecutionStart, &message_id);
        let result = match handler(payload) {
            Ok(value) => {
                self.emit(EventType::ExecutionOk, &message_id);
                outcome::ok(value)
            }
            Err(error) => {
                self.emit(EventType::ExecutionError, &message_id);
                outcome::err(error)
            }
        };
        self.emit(EventType::DispatchComplete, &message_id);
        Ok(result)
    }

    fn trace(&self) -> Vec<TraceRecord> {
        self.trace.clone()
    }
}

/// Envelope for `module`, with a per-run message id.
pub fn envelope(module: &str, run: u32) -> Envelope {
    json!({
        "message_id": format!("msg-{run}"),
        "target_module": module,
        "payload": {"n": 1},
    })
}
