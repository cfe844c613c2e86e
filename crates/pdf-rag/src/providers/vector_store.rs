//! Vector store provider trait for persisting and searching embeddings

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChunkMetadata, ScoredChunk, VectorEntry};

/// Trait for vector storage and similarity search
///
/// The production implementation is `LocalVectorStore`, a JSON-persisted
/// in-memory index. Entries are keyed by chunk ID; `upsert` replaces an
/// existing entry with the same ID.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or replace entries by ID. Either all entries land or the
    /// store is left unchanged.
    async fn upsert(&self, entries: Vec<VectorEntry>) -> Result<()>;

    /// Delete entries by ID, returning how many were actually removed
    async fn delete_by_ids(&self, ids: &[String]) -> Result<usize>;

    /// All stored chunk IDs
    async fn all_ids(&self) -> Result<BTreeSet<String>>;

    /// Every stored ID with its chunk metadata
    async fn all_metadatas(&self) -> Result<Vec<(String, ChunkMetadata)>>;

    /// The `top_k` most similar chunks, best first
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>>;

    /// Number of stored entries
    async fn count(&self) -> Result<usize>;

    /// Whether the store holds no entries
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.count().await? == 0)
    }

    /// Remove every entry and any persisted snapshot
    async fn clear(&self) -> Result<()>;

    /// Check whether the store is usable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
