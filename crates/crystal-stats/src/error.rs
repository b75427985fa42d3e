//! # Statistics Errors

use thiserror::Error;

/// Malformed statistical input. Rejected before any computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// No samples were supplied.
    #[error("cannot profile an empty sample")]
    EmptySample,

    /// A sample is NaN or infinite.
    #[error("sample {index} is not finite: {value}")]
    NonFinite {
        /// Position of the offending sample.
        index: usize,
        /// The offending value.
        value: f64,
    },
}
