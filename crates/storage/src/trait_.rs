//! Storage trait abstraction.

use async_trait::async_trait;
use evoarch_core::CycleRecord;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Store for the append-mostly run history.
///
/// This trait allows different storage backends to be plugged in. The
/// discovery engine is the sole writer within a run; every record is
/// persisted before the next iteration starts.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Save a cycle record, keyed by its iteration index. Idempotent
    /// upsert: putting the same record twice leaves the store unchanged.
    async fn put(&mut self, record: &CycleRecord) -> Result<()>;

    /// Load the record for an iteration index.
    async fn get(&self, iteration: u64) -> Result<Option<CycleRecord>>;

    /// List all records, ordered by iteration index.
    async fn list(&self) -> Result<Vec<CycleRecord>>;
}
