//! Candidate scoring.
//!
//! Turns a candidate design into a composite score via an external
//! language-model judge, degrading to a deterministic seeded fallback
//! when the judge is unreachable or replies with garbage. Scoring never
//! fails past this crate's boundary.

#![warn(missing_docs)]

mod judge;
mod evaluator;

pub use judge::{Judge, JudgeError, JudgeResult, OllamaJudge};
pub use evaluator::{Evaluator, EvaluatorConfig};
