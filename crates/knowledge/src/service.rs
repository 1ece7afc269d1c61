//! Knowledge service trait and static-corpus implementation.

use async_trait::async_trait;
use tracing::debug;

/// Retrieval service consulted by the evaluator.
#[async_trait]
pub trait KnowledgeService: Send + Sync {
    /// Return up to `top_k` snippets relevant to `text`, best first.
    /// Empty when no corpus is configured or `top_k` is zero.
    async fn query(&self, text: &str, top_k: usize) -> Vec<String>;
}

/// Keyword-ranked retrieval over a fixed snippet corpus.
pub struct StaticCorpus {
    entries: Vec<String>,
}

impl StaticCorpus {
    /// Corpus of built-in design notes.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                "Linear attention variants trade the quadratic cost of softmax \
                 attention for an approximation of its kernel."
                    .to_string(),
                "Raising num_layers or hidden_size adds capacity but grows compute \
                 and memory requirements roughly in proportion."
                    .to_string(),
                "Head count should divide the hidden size; very narrow heads tend \
                 to hurt quality more than fewer, wider heads."
                    .to_string(),
                "Strong candidate designs balance expressiveness against \
                 efficiency rather than maximizing either alone."
                    .to_string(),
            ],
        }
    }

    /// Empty corpus; every query returns nothing.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Load extra snippets (one per line, blanks skipped) on top of the
    /// built-in corpus.
    pub async fn with_corpus_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let mut corpus = Self::builtin();
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        corpus.entries.extend(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
        );
        Ok(corpus)
    }

    /// Number of snippets held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the corpus holds no snippets.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn relevance(entry: &str, query_words: &[String]) -> usize {
        let entry_lower = entry.to_lowercase();
        query_words
            .iter()
            .filter(|w| entry_lower.contains(w.as_str()))
            .count()
    }
}

#[async_trait]
impl KnowledgeService for StaticCorpus {
    async fn query(&self, text: &str, top_k: usize) -> Vec<String> {
        if top_k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let query_words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|w| w.len() > 2)
            .map(String::from)
            .collect();

        // Score each snippet by keyword overlap
        let mut scored: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e, Self::relevance(e, &query_words)))
            .filter(|(_, score)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1));

        if scored.is_empty() {
            // Nothing matched; hand back the head of the corpus rather than
            // leaving the prompt bare.
            debug!("No corpus match for query, returning leading snippets");
            return self.entries.iter().take(top_k).cloned().collect();
        }

        scored.into_iter().take(top_k).map(|(e, _)| e.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ranks_matching_snippets_first() {
        let corpus = StaticCorpus::builtin();
        let hits = corpus.query("linear attention kernel cost", 2).await;
        assert!(!hits.is_empty());
        assert!(hits[0].contains("Linear attention"));
    }

    #[tokio::test]
    async fn zero_top_k_returns_nothing() {
        let corpus = StaticCorpus::builtin();
        assert!(corpus.query("attention", 0).await.is_empty());
    }

    #[tokio::test]
    async fn empty_corpus_returns_nothing() {
        let corpus = StaticCorpus::empty();
        assert!(corpus.query("attention", 3).await.is_empty());
    }

    #[tokio::test]
    async fn unmatched_query_still_returns_snippets() {
        let corpus = StaticCorpus::builtin();
        let hits = corpus.query("zzz qqq", 2).await;
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn corpus_file_extends_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "gated convolutions work well at short range\n\n").unwrap();

        let corpus = StaticCorpus::with_corpus_file(&path).await.unwrap();
        assert_eq!(corpus.len(), StaticCorpus::builtin().len() + 1);

        let hits = corpus.query("gated convolutions", 1).await;
        assert!(hits[0].contains("gated convolutions"));
    }
}
