//! # crystal-crypto — Hash-Chained Event Logs
//!
//! Provides the tamper-evident event log that anchors every crystal:
//!
//! - **Chain builder** — append-only, each node committing to its parent.
//! - **Root computation** — one hash over the whole chain, with a fixed
//!   sentinel for the empty chain.
//! - **Offline link checks** — detect rewired parents and edited nodes in a
//!   chain read back from storage.
//!
//! ## Crate Policy
//!
//! - Depends only on `crystal-core` internally.
//! - All hashing goes through `crystal_core::CanonicalBytes`.
//! - No mocking of hashing in tests; all tests use real SHA-256.

pub mod chain;
pub mod error;

pub use chain::{
    compute_root, parent_link_breaks, verify_links, ChainBuilder, EventNode, LinkBreak, EMPTY_TREE,
};
pub use error::ChainError;
