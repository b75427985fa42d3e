//! # Crystallization Errors
//!
//! Only failures that prevent a crystal from being produced at all live here.
//! Failed invariants, causality violations, and non-determinism are recorded
//! in the crystal itself and never surface as errors.

use thiserror::Error;

use crystal_core::CanonicalizationError;
use crystal_crypto::ChainError;
use crystal_stats::StatsError;

use crate::dispatch::DispatchError;

/// Reasons `crystallize` returns without a crystal.
#[derive(Error, Debug)]
pub enum CrystallizeError {
    /// A dispatch call failed outright. No partial crystal is produced.
    #[error("run {run_index} failed to dispatch: {source}")]
    Dispatch {
        /// Index of the run whose dispatch failed.
        run_index: u32,
        /// The dispatcher's error.
        #[source]
        source: DispatchError,
    },

    /// The performance sample could not be profiled (e.g. zero runs).
    #[error("performance profile: {0}")]
    Profile(#[from] StatsError),

    /// An envelope, result, or trace could not be canonicalized.
    #[error("canonicalization: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The reference trace could not be chained.
    #[error("event chain: {0}")]
    Chain(#[from] ChainError),

    /// Zero determinism runs were requested.
    #[error("at least one determinism run is required to produce a reference run")]
    NoReferenceRun,
}
