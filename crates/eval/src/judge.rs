//! Judge trait and the Ollama-backed implementation.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Result type for judge calls.
pub type JudgeResult<T> = Result<T, JudgeError>;

/// Failures on the judged scoring path. All variants are recoverable:
/// the evaluator retries once and then takes the fallback path.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// Transport failure or timeout
    #[error("judge request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("judge returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for the log line
        body: String,
    },

    /// Reply arrived but carried no usable scores
    #[error("judge reply was not parseable: {0}")]
    Malformed(String),
}

/// A language-model completion endpoint.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Send `prompt` and return the generated text.
    async fn complete(&self, prompt: &str) -> JudgeResult<String>;
}

/// Judge backed by an Ollama generate endpoint.
#[derive(Clone)]
pub struct OllamaJudge {
    /// HTTP client
    client: Client,

    /// Ollama server URL
    url: String,

    /// Model name
    model: String,
}

impl OllamaJudge {
    /// Create a new Ollama judge. `timeout` bounds every call; a slow
    /// judge surfaces as an `Http` error rather than blocking the cycle.
    pub fn new(url: String, model: String, timeout: Duration) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url,
            model,
        }
    }
}

#[async_trait]
impl Judge for OllamaJudge {
    async fn complete(&self, prompt: &str) -> JudgeResult<String> {
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        debug!("Calling judge model {} ({} char prompt)", self.model, prompt.len());

        let response = self
            .client
            .post(format!("{}/api/generate", self.url))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(JudgeError::Status { status, body });
        }

        #[derive(serde::Deserialize)]
        struct Reply {
            response: String,
        }

        let reply: Reply = response.json().await?;
        Ok(reply.response)
    }
}
