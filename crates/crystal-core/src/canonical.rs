//! # Canonical Serialization — JCS-Compatible Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in hash computation across the crystallization engine. Every hash in a
//! crystal (event nodes, run fingerprints, the crystal seal itself) is derived
//! from bytes produced here.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()` (or `from_str_raw()` for
//! hashing an already-rendered string such as a concatenation of node hashes).
//! Any function that needs canonical bytes for hashing accepts
//! `&CanonicalBytes`, so a second serialization path cannot creep in.
//!
//! ## Canonicalization Rules
//!
//! 1. **Sorted keys** — object keys are sorted lexicographically at every
//!    nesting level.
//! 2. **Null normalization** — absent values (`Option::None`, unit) and
//!    non-finite floats become `null`, recursively.
//! 3. **Order-preserving arrays** — sequences keep their element order.
//! 4. **Compact output** — no whitespace, RFC 8785 number formatting
//!    (ECMAScript shortest round-trip form, so `1.0` renders as `1`).
//!
//! Serialization uses `serde_jcs` for RFC 8785 (JSON Canonicalization Scheme)
//! compliant output.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS-compatible canonicalization.
///
/// # Invariants
///
/// - Object keys are sorted at every depth.
/// - Missing values are `null`.
/// - Output is compact UTF-8 JSON.
///
/// These invariants are enforced by the constructor and cannot be violated
/// by downstream code because the inner `Vec<u8>` is private.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value cannot
    /// be represented as JSON (for example a map with non-string keys).
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let normalized = normalize_json_value(value);
        let bytes = serialize_canonical(&normalized)?;
        Ok(Self(bytes))
    }

    /// Wrap an already-rendered string verbatim.
    ///
    /// Used where the hashed input is a plain string rather than a JSON
    /// document: the concatenated node hashes of a chain root, or the
    /// `EMPTY_TREE` sentinel.
    pub fn from_str_raw(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }

    /// Access the canonical bytes for hash computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the canonical bytes as a string.
    ///
    /// Canonical bytes are always valid UTF-8: both constructors start from
    /// Rust strings.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Consume the bytes, returning the canonical string.
    pub fn into_string(self) -> String {
        String::from_utf8(self.0).unwrap_or_default()
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Render any serializable value as its canonical string.
///
/// Convenience over `CanonicalBytes::new(..)?.into_string()`.
pub fn canonicalize(obj: &impl Serialize) -> Result<String, CanonicalizationError> {
    Ok(CanonicalBytes::new(obj)?.into_string())
}

/// Recursively normalize a JSON value tree.
///
/// `serde_json::to_value` already maps `None` and non-finite floats to
/// `Value::Null`; the walk below keeps array order, rebuilds objects, and
/// folds floats with an exact integer value into integer form so that
/// `2.0` and `2` hash identically.
fn normalize_json_value(value: Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => value,
        Value::Number(ref n) => {
            if n.is_i64() || n.is_u64() {
                return value;
            }
            match n.as_f64() {
                Some(f) if !f.is_finite() => Value::Null,
                Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
                    // Exact integers below 2^53 are safe to cast.
                    Value::from(f as i64)
                }
                Some(_) => value,
                None => Value::Null,
            }
        }
        Value::Object(map) => {
            let normalized: serde_json::Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, normalize_json_value(v)))
                .collect();
            Value::Object(normalized)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_json_value).collect()),
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}
