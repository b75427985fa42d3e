//! # crystal-proof — Proof Crystallization Engine
//!
//! Turns a scenario (an envelope generator plus invariants) into a sealed
//! [`ProofCrystal`] by running it against an external dispatcher:
//!
//! - **Determinism** (`determinism.rs`): `N` isolated runs, output hashes
//!   compared against run 0.
//! - **Performance** (via `crystal-stats`): `M` further isolated runs, timed
//!   with the injected clock and profiled.
//! - **Event chain** (via `crystal-crypto`): run 0's trace is chained and
//!   rooted.
//! - **Causality** (`causality.rs`): the chain is checked against the
//!   dispatch event dependency table.
//! - **Invariants** (`invariant.rs`): built-in and scenario predicates, each
//!   evaluated in isolation.
//! - **Verdict and seal** (`crystallizer.rs`, `crystal.rs`).
//! - **Offline verification** (`verify.rs`) of stored crystals.
//!
//! ## Crate Policy
//!
//! - Runs are sequential and never share a dispatcher.
//! - Only dispatch failures abort crystallization; every other problem is
//!   recorded in the crystal.
//! - No `.unwrap()` outside tests.

pub mod causality;
pub mod crystal;
pub mod crystallizer;
pub mod determinism;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod invariant;
pub mod scenario;
pub mod verify;

// ─── Crystal ────────────────────────────────────────────────────────

pub use crystal::{ProofCrystal, Verdict, PROTOCOL_VERSION};
pub use crystallizer::{
    CrystallizeOptions, Crystallizer, CrystallizerConfig, DEFAULT_DETERMINISM_RUNS,
    DEFAULT_PERFORMANCE_RUNS,
};
pub use error::CrystallizeError;
pub use scenario::{CrystalScenario, CrystalScenarioBuilder};

// ─── Evidence ───────────────────────────────────────────────────────

pub use causality::{build_matrix, CausalityMatrix, CausalityVerdict, Violation};
pub use determinism::{prove, DeterminismFingerprint, RunHashes};
pub use invariant::{
    builtin_invariants, Invariant, InvariantCheck, InvariantError, InvariantStatus,
    RESULT_VALIDATION_ID,
};

// ─── Dispatch boundary ──────────────────────────────────────────────

pub use dispatch::{outcome, DispatchError, Dispatcher, Envelope, HandlerRegistry};

// ─── Verification and presentation ──────────────────────────────────

pub use format::format_crystal;
pub use verify::{verify_crystal, CrystalVerification};
