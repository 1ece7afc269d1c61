//! Candidate mutation.
//!
//! The evolver derives a child candidate from a parent by perturbing a
//! bounded subset of parameters inside their declared domains. Evolution
//! is a pure function of (parent, mutation rate, seed) so a run can be
//! replayed exactly.

#![warn(missing_docs)]

mod evolver;

pub use evolver::Evolver;
