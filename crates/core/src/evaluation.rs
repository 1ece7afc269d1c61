//! Evaluation results produced by the scoring path.

use crate::Time;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Scored by the external language-model judge
    Judge,
    /// Scored by the deterministic local fallback
    Fallback,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Judge => write!(f, "judge"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Composite score and sub-metrics for exactly one candidate.
///
/// Scores live in [0, 1]; higher is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Composite score in [0, 1]
    pub score: f64,
    /// Named sub-metrics, each in [0, 1]
    pub metrics: BTreeMap<String, f64>,
    /// Judge-derived or fallback-derived
    pub provenance: Provenance,
    /// Raw judge reply, kept for auditing judged scores
    pub raw_response: Option<String>,
    /// When the evaluation happened
    pub evaluated_at: Time,
}

impl EvaluationResult {
    /// Whether this score came from the fallback path.
    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}
