//! Run configuration.
//!
//! Loaded once at startup into an immutable structure and handed to each
//! component's constructor; nothing reads configuration after that.

use std::path::{Path, PathBuf};
use std::time::Duration;

use evoarch_analysis::AnalystConfig;
use evoarch_eval::EvaluatorConfig;
use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating configuration. All are
/// fatal before any cycle runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for this schema
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// An option failed validation
    #[error("invalid option {option}: {message}")]
    Invalid {
        /// Offending option name
        option: &'static str,
        /// Why it was rejected
        message: String,
    },
}

/// Full configuration surface for a discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Iterations to run
    pub num_cycles: usize,
    /// Fraction of parameters mutated per evolve step
    pub mutation_rate: f64,
    /// Whether the evaluator consults the knowledge service
    pub rag_enabled: bool,
    /// Snippets fetched per evaluation
    pub top_k: usize,
    /// Judge model identifier
    pub model_name: String,
    /// Judge base URL
    pub judge_url: String,
    /// Per-call judge timeout, seconds
    pub judge_timeout_secs: u64,
    /// Fixed backoff before the single judge retry, milliseconds
    pub retry_backoff_ms: u64,
    /// Stop threshold on the composite score
    pub score_target: f64,
    /// Consecutive non-improving cycles before a refocus
    pub stagnation_window: usize,
    /// Minimum score gain counted as an improvement
    pub epsilon: f64,
    /// Hard cap on total history length
    pub history_cap: usize,
    /// Base RNG seed for evolution and fallback scoring
    pub seed: u64,
    /// Run store directory
    pub database_path: PathBuf,
    /// Optional extra knowledge corpus file
    pub corpus_path: Option<PathBuf>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            num_cycles: 1,
            mutation_rate: 0.3,
            rag_enabled: true,
            top_k: 3,
            model_name: "llama3".to_string(),
            judge_url: "http://localhost:11434".to_string(),
            judge_timeout_secs: 60,
            retry_backoff_ms: 500,
            score_target: 0.95,
            stagnation_window: 5,
            epsilon: 0.01,
            history_cap: 1000,
            seed: 42,
            database_path: PathBuf::from("evoarch-data"),
            corpus_path: None,
        }
    }
}

impl DiscoveryConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every option; the first violation is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(option: &'static str, message: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                option,
                message: message.into(),
            }
        }

        if self.num_cycles == 0 {
            return Err(invalid("num_cycles", "must be at least 1"));
        }
        if !(self.mutation_rate > 0.0 && self.mutation_rate <= 1.0) {
            return Err(invalid("mutation_rate", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.score_target) {
            return Err(invalid("score_target", "must be in [0, 1]"));
        }
        if self.stagnation_window == 0 {
            return Err(invalid("stagnation_window", "must be at least 1"));
        }
        if self.epsilon < 0.0 {
            return Err(invalid("epsilon", "must not be negative"));
        }
        if self.history_cap == 0 {
            return Err(invalid("history_cap", "must be at least 1"));
        }
        if self.judge_timeout_secs == 0 {
            return Err(invalid("judge_timeout_secs", "must be at least 1"));
        }
        Ok(())
    }

    /// Judge call timeout as a duration.
    pub fn judge_timeout(&self) -> Duration {
        Duration::from_secs(self.judge_timeout_secs)
    }

    /// The evaluator's slice of this configuration.
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            rag_enabled: self.rag_enabled,
            top_k: self.top_k,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            fallback_seed: self.seed,
        }
    }

    /// The analyst's slice of this configuration.
    pub fn analyst_config(&self) -> AnalystConfig {
        AnalystConfig {
            score_target: self.score_target,
            stagnation_window: self.stagnation_window,
            epsilon: self.epsilon,
            history_cap: self.history_cap,
        }
    }
}
