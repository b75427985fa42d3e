//! # Chain Errors

use thiserror::Error;

use crystal_core::CanonicalizationError;

/// Error while extending an event chain.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The event payload could not be rendered canonically.
    #[error("event payload canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}
