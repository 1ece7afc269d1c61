//! The discovery-cycle orchestrator.
//!
//! Drives the loop: evolve a child from the best-known parent, score it,
//! analyse the score against history, persist the record, repeat. Judge
//! failures are absorbed by the evaluator; only storage failures and bad
//! configuration are fatal.

#![warn(missing_docs)]

mod config;
mod engine;

pub use config::{ConfigError, DiscoveryConfig};
pub use engine::{DiscoveryEngine, PipelineError};
