//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by the crystallization crates. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Canonicalization errors carry the underlying serializer message.
//! - Anything that can be expressed as verdict data (failed invariants,
//!   causality violations, tampering found by offline verification) is not an
//!   error at all; it is recorded in the crystal.

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum CrystalError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An event-type string outside the dispatch event table.
    #[error("unknown event type: {0:?}")]
    UnknownEventType(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
