//! JSON file storage implementation.
//!
//! Stores each cycle record as `<iteration>.json` under a data directory.
//! Records are small and append-mostly, so one file per record keeps the
//! history inspectable with ordinary tools.

use std::path::{Path, PathBuf};

use evoarch_core::CycleRecord;
use tokio::fs;
use tracing::debug;

use super::{Result, RunStore, StorageError};

/// File-based JSON storage backend.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    /// Create storage rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn record_path(&self, iteration: u64) -> PathBuf {
        self.root.join(format!("{:06}.json", iteration))
    }
}

#[async_trait::async_trait]
impl RunStore for JsonStore {
    async fn put(&mut self, record: &CycleRecord) -> Result<()> {
        let path = self.record_path(record.iteration);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json.as_bytes()).await?;
        debug!("Persisted cycle {} to {}", record.iteration, path.display());
        Ok(())
    }

    async fn get(&self, iteration: u64) -> Result<Option<CycleRecord>> {
        read_json(&self.record_path(iteration)).await
    }

    async fn list(&self) -> Result<Vec<CycleRecord>> {
        let mut records: Vec<CycleRecord> = list_dir(&self.root).await?;
        records.sort_by_key(|r| r.iteration);
        Ok(records)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Ok(Some(item)) = read_json(&entry.path()).await {
            items.push(item);
        }
    }
    Ok(items)
}
