//! # crystal-core — Foundational Types for Proof Crystallization
//!
//! This crate is the bedrock of the crystallization workspace. Every other
//! crate depends on `crystal-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** ALL hash computation flows through
//!    `CanonicalBytes`. No raw `serde_json::to_vec()` for hashes. A crystal
//!    recomputed offline must hash to the same bytes it was sealed with.
//!
//! 2. **`sha256_hex()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that every hash path goes through canonicalization.
//!
//! 3. **Single `EventType` enum.** One definition of the dispatch event table,
//!    exhaustive `match` for the causal dependency lookup.
//!
//! 4. **Injected time.** Nothing reads the wall clock directly; a [`Clock`] is
//!    passed in so deterministic replays produce identical crystals.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `crystal-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod clock;
pub mod digest;
pub mod error;
pub mod event;

// Re-export primary types for ergonomic imports.
pub use canonical::{canonicalize, CanonicalBytes};
pub use clock::{Clock, FixedClock, SteppingClock, SystemClock};
pub use digest::{hash_object, hash_str, is_hex_64, sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, CrystalError};
pub use event::{EventType, TraceRecord, EVENT_TYPE_COUNT};
