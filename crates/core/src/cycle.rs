//! Cycle records: the append-only experiment history.

use crate::{Candidate, EvaluationResult};
use serde::{Deserialize, Serialize};

/// What the analyst recommends after a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Keep iterating
    Continue,
    /// End the run; the history so far is the result
    Stop,
    /// Keep iterating, but the search has gone flat for the given reason
    Refocus(String),
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::Stop => write!(f, "stop"),
            Self::Refocus(reason) => write!(f, "refocus ({})", reason),
        }
    }
}

/// One iteration's full outcome.
///
/// Records are totally ordered by `iteration`; no two records in a run
/// share an iteration index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    /// Position in the run, starting at 1
    pub iteration: u64,
    /// The candidate this cycle produced
    pub candidate: Candidate,
    /// Its evaluation
    pub result: EvaluationResult,
    /// The analyst's verdict
    pub recommendation: Recommendation,
}

impl CycleRecord {
    /// Stable storage key for this record.
    pub fn key(&self) -> String {
        format!("{:06}", self.iteration)
    }
}

/// Best-known selection policy: the record with the highest composite
/// score, tie-broken by lowest generation, then earliest iteration.
pub fn best_record(records: &[CycleRecord]) -> Option<&CycleRecord> {
    records.iter().reduce(|best, r| {
        let better = r.result.score > best.result.score
            || (r.result.score == best.result.score
                && (r.candidate.generation < best.candidate.generation
                    || (r.candidate.generation == best.candidate.generation
                        && r.iteration < best.iteration)));
        if better {
            r
        } else {
            best
        }
    })
}
