//! In-memory storage backend.
//!
//! Used by tests and by callers that want a run without any disk state.

use std::collections::BTreeMap;

use evoarch_core::CycleRecord;

use super::{Result, RunStore};

/// Map-backed store; ordering falls out of the key type.
#[derive(Default)]
pub struct MemoryStore {
    records: BTreeMap<u64, CycleRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl RunStore for MemoryStore {
    async fn put(&mut self, record: &CycleRecord) -> Result<()> {
        self.records.insert(record.iteration, record.clone());
        Ok(())
    }

    async fn get(&self, iteration: u64) -> Result<Option<CycleRecord>> {
        Ok(self.records.get(&iteration).cloned())
    }

    async fn list(&self) -> Result<Vec<CycleRecord>> {
        Ok(self.records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evoarch_core::{EvaluationResult, Provenance, Recommendation, SearchSpace};
    use std::collections::BTreeMap;

    fn record(iteration: u64) -> CycleRecord {
        CycleRecord {
            iteration,
            candidate: SearchSpace::transformer().seed_candidate(),
            result: EvaluationResult {
                score: 0.0,
                metrics: BTreeMap::new(),
                provenance: Provenance::Fallback,
                raw_response: None,
                evaluated_at: chrono::Utc::now(),
            },
            recommendation: Recommendation::Continue,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_by_iteration() {
        let mut store = MemoryStore::new();
        store.put(&record(1)).await.unwrap();
        store.put(&record(1)).await.unwrap();
        store.put(&record(2)).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].iteration, 1);
        assert_eq!(listed[1].iteration, 2);
    }
}
