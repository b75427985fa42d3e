//! # crystal-stats — Performance Profiling
//!
//! Implements the statistics a crystal carries about its performance runs:
//!
//! - **Profile** (`profile.rs`): nearest-rank percentiles, population
//!   moments, a 95% confidence interval, distribution shape, and 3σ outliers.
//!
//! - **Rank test** (`rank.rs`): the Mann–Whitney U two-sample test with a
//!   normal approximation, for comparing duration samples across versions.
//!
//! - **Report** (`report.rs`): markdown rendering of named profiles.
//!
//! ## Crate Policy
//!
//! - Pure functions only; no clock, no I/O, no logging.
//! - Empty or non-finite input is rejected up front with `StatsError`.
//! - Identical inputs give bit-identical outputs.

pub mod error;
pub mod profile;
pub mod rank;
pub mod report;

pub use error::StatsError;
pub use profile::{percentile, profile, ConfidenceInterval, Distribution, StatisticalProfile};
pub use rank::{mann_whitney_u, mann_whitney_u_detailed, normal_cdf, MannWhitneyResult};
pub use report::markdown_table;
