//! Recommendation logic.

use evoarch_core::{Candidate, CycleRecord, EvaluationResult, Recommendation};
use tracing::debug;

/// Configuration for the analyst.
#[derive(Debug, Clone)]
pub struct AnalystConfig {
    /// Stop once a cycle reaches this composite score
    pub score_target: f64,
    /// Consecutive non-improving cycles before a refocus
    pub stagnation_window: usize,
    /// Minimum score gain counted as an improvement
    pub epsilon: f64,
    /// Hard cap on total history length
    pub history_cap: usize,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            score_target: 0.95,
            stagnation_window: 5,
            epsilon: 0.01,
            history_cap: 1000,
        }
    }
}

/// Compares a new result against history and produces a recommendation.
pub struct Analyst {
    config: AnalystConfig,
}

impl Analyst {
    /// Create an analyst.
    pub fn new(config: AnalystConfig) -> Self {
        Self { config }
    }

    /// Interpret `result` for `candidate` against the prior `history`
    /// (records from earlier iterations only, in order).
    ///
    /// Stop takes precedence over refocus: a run that reached its target
    /// halts even if the recent window was flat.
    pub fn analyse(
        &self,
        candidate: &Candidate,
        result: &EvaluationResult,
        history: &[CycleRecord],
    ) -> Recommendation {
        let best_prior = history
            .iter()
            .map(|r| r.result.score)
            .fold(f64::NEG_INFINITY, f64::max);
        debug!(
            "Analysing {}: score {:.3}, best prior {:.3}",
            candidate.id, result.score, best_prior
        );

        if result.score >= self.config.score_target {
            return Recommendation::Stop;
        }
        if history.len() + 1 >= self.config.history_cap {
            return Recommendation::Stop;
        }
        if self.stagnation_streak(result, history) >= self.config.stagnation_window {
            return Recommendation::Refocus("stagnation".to_string());
        }
        Recommendation::Continue
    }

    /// Number of trailing cycles (current included) without an
    /// improvement on the running best beyond epsilon. The first cycle
    /// of a run initializes the running best and counts as non-improving.
    fn stagnation_streak(&self, result: &EvaluationResult, history: &[CycleRecord]) -> usize {
        let mut best: Option<f64> = None;
        let mut streak = 0;

        let scores = history
            .iter()
            .map(|r| r.result.score)
            .chain(std::iter::once(result.score));
        for score in scores {
            match best {
                Some(b) if score > b + self.config.epsilon => streak = 0,
                _ => streak += 1,
            }
            best = Some(best.map_or(score, |b| b.max(score)));
        }
        streak
    }
}
