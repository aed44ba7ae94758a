//! Persistent backing for cache snapshots

use std::marker::PhantomData;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// Somewhere a snapshot can be saved and read back
#[async_trait]
pub trait SnapshotStore<T>: Send + Sync {
    /// Read the stored snapshot; `None` when nothing has been saved yet
    async fn load(&self) -> anyhow::Result<Option<T>>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &T) -> anyhow::Result<()>;
}

/// Snapshot kept as a single JSON file
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn load(&self) -> anyhow::Result<Option<T>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };

        let snapshot = serde_json::from_slice(&raw)
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &T) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create {}", dir.display()))?;
        }

        let raw = serde_json::to_vec(snapshot)?;
        // write-then-rename so a reader never sees a half-written file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("rename {}", tmp.display()))?;
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryStore;
