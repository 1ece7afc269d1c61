//! Evoarch core data models.
//!
//! This crate defines the fundamental data structures that power the
//! architecture discovery loop.

#![warn(missing_docs)]

// Core identities
mod id;

// Candidate designs and their parameter space
mod candidate;
mod space;

// Evaluation and cycle history
mod evaluation;
mod cycle;

// Re-exports
pub use id::CandidateId;

pub use candidate::{Candidate, ParamValue};
pub use space::{ParamDomain, SearchSpace};

pub use evaluation::{EvaluationResult, Provenance};
pub use cycle::{best_record, CycleRecord, Recommendation};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
