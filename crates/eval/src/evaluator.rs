//! Composite-scoring evaluator with a deterministic fallback path.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use evoarch_core::{Candidate, EvaluationResult, Provenance};
use evoarch_knowledge::KnowledgeService;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use tracing::{debug, warn};

use crate::{Judge, JudgeError, JudgeResult};

/// Sub-metrics the judge is asked for, each in [0, 1].
const METRIC_KEYS: [&str; 3] = ["performance", "novelty", "complexity"];

/// Configuration for the evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Whether to enrich prompts with knowledge-service snippets
    pub rag_enabled: bool,
    /// Snippets fetched per evaluation; 0 disables retrieval
    pub top_k: usize,
    /// Fixed pause before the single retry of a failed judge call
    pub retry_backoff: Duration,
    /// Base seed for fallback scoring
    pub fallback_seed: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            rag_enabled: true,
            top_k: 3,
            retry_backoff: Duration::from_millis(500),
            fallback_seed: 42,
        }
    }
}

/// Scores candidates via a judge, with local recovery when it fails.
pub struct Evaluator<J: Judge> {
    judge: J,
    knowledge: Option<Arc<dyn KnowledgeService>>,
    config: EvaluatorConfig,
}

impl<J: Judge> Evaluator<J> {
    /// Create an evaluator around `judge`.
    pub fn new(judge: J, config: EvaluatorConfig) -> Self {
        Self {
            judge,
            knowledge: None,
            config,
        }
    }

    /// Attach a knowledge service for prompt enrichment.
    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeService>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    /// Score a candidate. Never errors: a judge failure is retried once
    /// after a fixed backoff, then the deterministic fallback scores the
    /// candidate with provenance marked accordingly.
    pub async fn evaluate(&self, candidate: &Candidate) -> EvaluationResult {
        match self.try_judge(candidate).await {
            Ok(result) => result,
            Err(first) => {
                warn!("Judge evaluation failed ({}), retrying once", first);
                tokio::time::sleep(self.config.retry_backoff).await;
                match self.try_judge(candidate).await {
                    Ok(result) => result,
                    Err(second) => {
                        warn!(
                            "Judge retry failed ({}), scoring {} via fallback",
                            second, candidate.id
                        );
                        self.fallback(candidate)
                    }
                }
            }
        }
    }

    /// One judged scoring attempt.
    pub async fn try_judge(&self, candidate: &Candidate) -> JudgeResult<EvaluationResult> {
        let prompt = self.build_prompt(candidate).await;
        let raw = self.judge.complete(&prompt).await?;
        let metrics = parse_metrics(&raw)?;

        Ok(EvaluationResult {
            score: composite(&metrics),
            metrics,
            provenance: Provenance::Judge,
            raw_response: Some(raw),
            evaluated_at: chrono::Utc::now(),
        })
    }

    /// Deterministic synthetic score, reproducible for a fixed
    /// (candidate, seed) pair.
    pub fn fallback(&self, candidate: &Candidate) -> EvaluationResult {
        let bits = candidate.id.as_u128();
        let seed = self.config.fallback_seed ^ (bits as u64) ^ ((bits >> 64) as u64);
        let mut rng = StdRng::seed_from_u64(seed);

        let metrics: BTreeMap<String, f64> = METRIC_KEYS
            .iter()
            .map(|key| (key.to_string(), rng.gen::<f64>()))
            .collect();

        EvaluationResult {
            score: composite(&metrics),
            metrics,
            provenance: Provenance::Fallback,
            raw_response: None,
            evaluated_at: chrono::Utc::now(),
        }
    }

    async fn build_prompt(&self, candidate: &Candidate) -> String {
        let mut prompt = String::from(
            "You are an expert model architect. Assess the quality of the \
             following candidate design.\n",
        );

        if self.config.rag_enabled && self.config.top_k > 0 {
            if let Some(knowledge) = &self.knowledge {
                let snippets = knowledge
                    .query(&candidate.summary(), self.config.top_k)
                    .await;
                debug!("Retrieved {} snippets for {}", snippets.len(), candidate.id);
                if !snippets.is_empty() {
                    prompt.push_str("Relevant notes:\n");
                    for snippet in snippets {
                        prompt.push_str("- ");
                        prompt.push_str(&snippet);
                        prompt.push('\n');
                    }
                }
            }
        }

        prompt.push_str(&format!(
            "Candidate (generation {}):\n{}\n",
            candidate.generation,
            candidate.description_json()
        ));
        prompt.push_str(
            "Reply with a single JSON object with keys \"performance\", \
             \"novelty\" and \"complexity\", each a number between 0 and 1. \
             Do not include any other text.\n",
        );
        prompt
    }
}

/// Weighted composite over the sub-metrics, clamped to [0, 1]. Rewards
/// performance and novelty, credits simplicity; a perfect design scores
/// 1.0. Absent metrics count as zero.
fn composite(metrics: &BTreeMap<String, f64>) -> f64 {
    let get = |key: &str| metrics.get(key).copied().unwrap_or(0.0);
    (0.6 * get("performance") + 0.3 * get("novelty") + 0.1 * (1.0 - get("complexity")))
        .clamp(0.0, 1.0)
}

/// Pull the sub-metrics out of a judge reply.
///
/// Models wrap the object in prose or code fences often enough that we
/// search for the first JSON object instead of parsing the whole reply.
fn parse_metrics(raw: &str) -> JudgeResult<BTreeMap<String, f64>> {
    let object = Regex::new(r"(?s)\{.*?\}")
        .map_err(|e| JudgeError::Malformed(e.to_string()))?
        .find(raw)
        .ok_or_else(|| JudgeError::Malformed("no JSON object in reply".to_string()))?;

    let value: serde_json::Value = serde_json::from_str(object.as_str())
        .map_err(|e| JudgeError::Malformed(format!("bad JSON object: {}", e)))?;

    let mut metrics = BTreeMap::new();
    for key in METRIC_KEYS {
        if let Some(v) = value.get(key).and_then(|v| v.as_f64()) {
            metrics.insert(key.to_string(), v.clamp(0.0, 1.0));
        }
    }

    if metrics.is_empty() {
        return Err(JudgeError::Malformed(format!(
            "no known metrics in reply: {}",
            object.as_str()
        )));
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use evoarch_core::SearchSpace;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Judge that replays a scripted sequence of replies.
    struct ScriptedJudge {
        replies: Mutex<VecDeque<Result<String, ()>>>,
    }

    impl ScriptedJudge {
        fn new(replies: Vec<Result<String, ()>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
            }
        }

        fn always_down() -> Self {
            Self::new(vec![Err(()), Err(())])
        }
    }

    #[async_trait]
    impl Judge for ScriptedJudge {
        async fn complete(&self, _prompt: &str) -> JudgeResult<String> {
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Ok(reply)) => Ok(reply),
                _ => Err(JudgeError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }
    }

    fn config() -> EvaluatorConfig {
        EvaluatorConfig {
            retry_backoff: Duration::ZERO,
            ..Default::default()
        }
    }

    fn candidate() -> Candidate {
        SearchSpace::transformer().seed_candidate()
    }

    #[tokio::test]
    async fn judged_path_parses_plain_json() {
        let judge = ScriptedJudge::new(vec![Ok(
            r#"{"performance": 0.8, "novelty": 0.6, "complexity": 0.4}"#.to_string(),
        )]);
        let evaluator = Evaluator::new(judge, config());

        let result = evaluator.evaluate(&candidate()).await;
        assert_eq!(result.provenance, Provenance::Judge);
        assert!((result.score - (0.6 * 0.8 + 0.3 * 0.6 + 0.1 * (1.0 - 0.4))).abs() < 1e-9);
        assert_eq!(result.metrics["performance"], 0.8);
        assert!(result.raw_response.is_some());
    }

    #[tokio::test]
    async fn judged_path_parses_fenced_json() {
        let reply = "Here you go:\n```json\n{\"performance\": 0.5, \"novelty\": 0.5, \"complexity\": 0.5}\n```".to_string();
        let judge = ScriptedJudge::new(vec![Ok(reply)]);
        let evaluator = Evaluator::new(judge, config());

        let result = evaluator.evaluate(&candidate()).await;
        assert_eq!(result.provenance, Provenance::Judge);
        assert_eq!(result.metrics.len(), 3);
    }

    #[tokio::test]
    async fn out_of_range_metrics_are_clamped() {
        let judge = ScriptedJudge::new(vec![Ok(
            r#"{"performance": 1.7, "novelty": -0.5, "complexity": 0.0}"#.to_string(),
        )]);
        let evaluator = Evaluator::new(judge, config());

        let result = evaluator.evaluate(&candidate()).await;
        assert_eq!(result.metrics["performance"], 1.0);
        assert_eq!(result.metrics["novelty"], 0.0);
        assert!(result.score <= 1.0);
    }

    #[tokio::test]
    async fn transient_failure_then_success_stays_judged() {
        let judge = ScriptedJudge::new(vec![
            Err(()),
            Ok(r#"{"performance": 0.9, "novelty": 0.1, "complexity": 0.1}"#.to_string()),
        ]);
        let evaluator = Evaluator::new(judge, config());

        let result = evaluator.evaluate(&candidate()).await;
        assert_eq!(result.provenance, Provenance::Judge);
    }

    #[tokio::test]
    async fn unreachable_judge_falls_back() {
        let evaluator = Evaluator::new(ScriptedJudge::always_down(), config());

        let result = evaluator.evaluate(&candidate()).await;
        assert_eq!(result.provenance, Provenance::Fallback);
        assert!((0.0..=1.0).contains(&result.score));
        assert_eq!(result.metrics.len(), 3);
    }

    #[tokio::test]
    async fn garbage_reply_falls_back() {
        let judge = ScriptedJudge::new(vec![
            Ok("I cannot assess this.".to_string()),
            Ok("{\"mood\": \"good\"}".to_string()),
        ]);
        let evaluator = Evaluator::new(judge, config());

        let result = evaluator.evaluate(&candidate()).await;
        assert_eq!(result.provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn fallback_is_deterministic_per_candidate() {
        let evaluator = Evaluator::new(ScriptedJudge::always_down(), config());
        let c = candidate();

        let a = evaluator.fallback(&c);
        let b = evaluator.fallback(&c);
        assert_eq!(a.score, b.score);
        assert_eq!(a.metrics, b.metrics);
    }

    #[tokio::test]
    async fn fallback_seed_changes_the_score() {
        let c = candidate();
        let a = Evaluator::new(ScriptedJudge::always_down(), config()).fallback(&c);
        let b = Evaluator::new(
            ScriptedJudge::always_down(),
            EvaluatorConfig {
                fallback_seed: 43,
                ..config()
            },
        )
        .fallback(&c);
        assert_ne!(a.metrics, b.metrics);
    }

    proptest! {
        #[test]
        fn fallback_is_reproducible_for_any_seed(seed in any::<u64>()) {
            let cfg = EvaluatorConfig { fallback_seed: seed, ..EvaluatorConfig::default() };
            let evaluator = Evaluator::new(ScriptedJudge::always_down(), cfg);
            let c = SearchSpace::transformer().seed_candidate();

            let a = evaluator.fallback(&c);
            let b = evaluator.fallback(&c);
            prop_assert_eq!(a.score, b.score);
            prop_assert_eq!(a.metrics, b.metrics);
        }
    }
}
