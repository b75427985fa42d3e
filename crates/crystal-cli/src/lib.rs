//! # crystal-cli — Proof Crystal Command-Line Interface
//!
//! Offline tooling over crystals produced by `crystal-proof`. Nothing here
//! dispatches envelopes; every subcommand works from files on disk.
//!
//! ## Subcommands
//!
//! - `verify` — Recompute every hash and surface recorded failures
//! - `inspect` — Boxed summary, optionally with the event chain
//! - `stats` — Markdown table of performance profiles
//! - `compare` — Mann-Whitney U test between two sample files
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers write to a caller-supplied `Write` and delegate to the domain
//!   crates.

pub mod compare;
pub mod input;
pub mod inspect;
pub mod stats;
pub mod verify;
