//! Local JSON-persisted vector store
//!
//! Keeps every entry in memory behind an `RwLock` and mirrors the full set
//! to a JSON snapshot on each mutation. Mutations build the next map first
//! and swap it in only after the snapshot is written, so a failed write
//! leaves both memory and disk untouched.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::types::{ChunkMetadata, ScoredChunk, VectorEntry};

use super::vector_store::VectorStoreProvider;

/// In-memory vector index with a JSON snapshot on disk
pub struct LocalVectorStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    entries: RwLock<HashMap<String, VectorEntry>>,
    /// Snapshot location; `None` keeps the store memory-only
    snapshot_path: Option<PathBuf>,
}

impl LocalVectorStore {
    /// Create a memory-only store
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(HashMap::new()),
                snapshot_path: None,
            }),
        }
    }

    /// Create a store persisted at `path`, loading an existing snapshot if present
    pub fn with_snapshot(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let loaded = load_snapshot(&path)?;
            info!(entries = loaded.len(), file = %path.display(), "Loaded vector index snapshot");
            loaded
        } else {
            HashMap::new()
        };

        Ok(Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(entries),
                snapshot_path: Some(path),
            }),
        })
    }

    /// Create from the storage configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::with_snapshot(config.index_path.clone())
    }
}

impl StoreInner {
    fn apply_upsert(&self, entries: Vec<VectorEntry>) -> Result<()> {
        let mut next = self.entries.read().clone();

        // all entries must match the dimensionality already in the store,
        // or that of the first incoming entry when the store is empty
        let expected = next
            .values()
            .next()
            .map(|entry| entry.embedding.len())
            .or_else(|| entries.first().map(|entry| entry.embedding.len()));

        let offending: Vec<String> = entries
            .iter()
            .filter(|entry| {
                entry.id.is_empty()
                    || entry.embedding.is_empty()
                    || Some(entry.embedding.len()) != expected
            })
            .map(|entry| format!("'{}'", entry.id))
            .collect();

        if !offending.is_empty() {
            return Err(Error::vector_db(format!(
                "rejecting upsert of {} entrie(s), invalid ID or dimensions: [{}]",
                offending.len(),
                offending.join(", ")
            )));
        }

        for entry in entries {
            next.insert(entry.id.clone(), entry);
        }

        self.persist(&next)?;
        *self.entries.write() = next;
        Ok(())
    }

    fn apply_delete(&self, ids: Vec<String>) -> Result<usize> {
        let mut next = self.entries.read().clone();
        let mut removed = 0;
        for id in &ids {
            if next.remove(id).is_some() {
                removed += 1;
            }
        }
        if removed == 0 {
            return Ok(0);
        }
        self.persist(&next)?;
        *self.entries.write() = next;
        Ok(removed)
    }

    fn apply_clear(&self) -> Result<()> {
        if let Some(path) = &self.snapshot_path {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        self.entries.write().clear();
        Ok(())
    }

    fn search_sync(&self, query: &[f32], top_k: usize) -> Vec<ScoredChunk> {
        let entries = self.entries.read();
        let mut scored: Vec<(&String, f32)> = entries
            .iter()
            .map(|(id, entry)| (id, cosine_similarity(query, &entry.embedding)))
            .collect();
        // ties break on ID so results are stable across runs
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(id, score)| {
                let entry = &entries[id];
                ScoredChunk {
                    text: entry.text.clone(),
                    metadata: entry.metadata.clone(),
                    score,
                }
            })
            .collect()
    }

    /// Write the snapshot via a temp file so a crash never truncates it
    fn persist(&self, entries: &HashMap<String, VectorEntry>) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut snapshot: Vec<&VectorEntry> = entries.values().collect();
        snapshot.sort_by(|a, b| a.id.cmp(&b.id));
        let json = serde_json::to_string(&snapshot)?;

        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        debug!(entries = entries.len(), file = %path.display(), "Persisted vector index snapshot");
        Ok(())
    }
}

fn load_snapshot(path: &Path) -> Result<HashMap<String, VectorEntry>> {
    let json = std::fs::read_to_string(path)?;
    let list: Vec<VectorEntry> = serde_json::from_str(&json)?;
    Ok(list.into_iter().map(|entry| (entry.id.clone(), entry)).collect())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn upsert(&self, entries: Vec<VectorEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.apply_upsert(entries))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<usize> {
        let inner = Arc::clone(&self.inner);
        let ids = ids.to_vec();
        tokio::task::spawn_blocking(move || inner.apply_delete(ids))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn all_ids(&self) -> Result<BTreeSet<String>> {
        Ok(self.inner.entries.read().keys().cloned().collect())
    }

    async fn all_metadatas(&self) -> Result<Vec<(String, ChunkMetadata)>> {
        let mut pairs: Vec<(String, ChunkMetadata)> = self
            .inner
            .entries
            .read()
            .iter()
            .map(|(id, entry)| (id.clone(), entry.metadata.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(pairs)
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let inner = Arc::clone(&self.inner);
        let query = query_embedding.to_vec();
        tokio::task::spawn_blocking(move || Ok(inner.search_sync(&query, top_k)))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.entries.read().len())
    }

    async fn clear(&self) -> Result<()> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.apply_clear())
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "local-json"
    }
}
