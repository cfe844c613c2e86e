//! Diff-based synchronization between split documents and the vector store

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::{Chunk, VectorEntry};

/// Keeps the vector store in step with the chunked documents.
///
/// `sync` only embeds and inserts chunks whose IDs are not in the store
/// yet, so re-ingesting an unchanged document is a no-op. All mutations of
/// the store go through one async mutex; embedding and store IO happen
/// inside the critical section so concurrent syncs cannot interleave their
/// read-diff-write cycles.
pub struct IndexSynchronizer {
    store: Arc<dyn VectorStoreProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    sync_lock: Mutex<()>,
}

impl IndexSynchronizer {
    pub fn new(store: Arc<dyn VectorStoreProvider>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            sync_lock: Mutex::new(()),
        }
    }

    /// Add every chunk that is not already indexed. Returns the IDs that
    /// were actually added, in order.
    pub async fn sync(&self, chunks: &[Chunk]) -> Result<BTreeSet<String>> {
        let _guard = self.sync_lock.lock().await;

        let existing = self.store.all_ids().await?;
        let to_add: Vec<&Chunk> = chunks
            .iter()
            .filter(|chunk| !existing.contains(&chunk.id))
            .collect();

        if to_add.is_empty() {
            info!(
                chunks = chunks.len(),
                indexed = existing.len(),
                "No new chunks to add"
            );
            return Ok(BTreeSet::new());
        }

        info!(
            new = to_add.len(),
            chunks = chunks.len(),
            indexed = existing.len(),
            "Adding new chunks to the index"
        );

        let texts: Vec<String> = to_add.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let entries: Vec<VectorEntry> = to_add
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorEntry {
                id: chunk.id.clone(),
                embedding,
                text: chunk.text.clone(),
                metadata: chunk.metadata(),
            })
            .collect();

        let added: BTreeSet<String> = to_add.iter().map(|chunk| chunk.id.clone()).collect();
        self.store
            .upsert(entries)
            .await
            .map_err(|e| Error::index(added.iter().cloned().collect(), e.to_string()))?;

        Ok(added)
    }

    /// Remove every indexed chunk belonging to `source`. Returns the number
    /// of chunks removed; an unknown source removes nothing.
    pub async fn remove_by_source(&self, source: &str) -> Result<usize> {
        let _guard = self.sync_lock.lock().await;

        let ids: Vec<String> = self
            .store
            .all_metadatas()
            .await?
            .into_iter()
            .filter(|(_, metadata)| metadata.source == source)
            .map(|(id, _)| id)
            .collect();

        if ids.is_empty() {
            return Ok(0);
        }

        let removed = self
            .store
            .delete_by_ids(&ids)
            .await
            .map_err(|e| Error::index(ids.clone(), e.to_string()))?;
        info!(source = %source, removed, "Removed document from the index");
        Ok(removed)
    }

    /// Drop every entry and any persisted snapshot
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.sync_lock.lock().await;
        self.store.clear().await
    }

    /// Number of indexed chunks
    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::identity::assign_ids;
    use crate::providers::LocalVectorStore;
    use async_trait::async_trait;

    /// Deterministic three-dimensional embeddings derived from the text
    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let first = text.bytes().next().unwrap_or(0) as f32;
            Ok(vec![text.len() as f32, first, 1.0])
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("embedder offline"))
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn doc_chunks(source: &str, texts: &[&str]) -> Vec<Chunk> {
        assign_ids(
            texts
                .iter()
                .map(|text| Chunk::new(source, 0, *text))
                .collect(),
        )
    }

    fn synchronizer() -> IndexSynchronizer {
        IndexSynchronizer::new(
            Arc::new(LocalVectorStore::in_memory()),
            Arc::new(FakeEmbedder),
        )
    }

    #[tokio::test]
    async fn test_sync_adds_only_new_chunks() {
        let sync = synchronizer();
        let chunks = doc_chunks("doc.pdf", &["first", "second"]);

        let added = sync.sync(&chunks).await.unwrap();
        assert_eq!(added.len(), 2);
        assert!(added.contains("doc.pdf-0-1"));

        // same chunks again plus one more: only the new one lands
        let chunks = doc_chunks("doc.pdf", &["first", "second", "third"]);
        let added = sync.sync(&chunks).await.unwrap();
        assert_eq!(added.len(), 1);
        assert!(added.contains("doc.pdf-0-3"));
        assert_eq!(sync.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sync_unchanged_document_is_noop() {
        let sync = synchronizer();
        let chunks = doc_chunks("doc.pdf", &["alpha", "beta"]);

        sync.sync(&chunks).await.unwrap();
        let added = sync.sync(&chunks).await.unwrap();
        assert!(added.is_empty());
        assert_eq!(sync.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_remove_by_source_only_touches_that_document() {
        let sync = synchronizer();
        sync.sync(&doc_chunks("a.pdf", &["one", "two"])).await.unwrap();
        sync.sync(&doc_chunks("b.pdf", &["three"])).await.unwrap();

        let removed = sync.remove_by_source("a.pdf").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(sync.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_removed_document_resyncs_with_identical_ids() {
        let sync = synchronizer();
        let chunks = doc_chunks("doc.pdf", &["one", "two"]);

        let first = sync.sync(&chunks).await.unwrap();
        sync.remove_by_source("doc.pdf").await.unwrap();
        assert_eq!(sync.count().await.unwrap(), 0);

        let second = sync.sync(&chunks).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(sync.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_remove_unknown_source_returns_zero() {
        let sync = synchronizer();
        sync.sync(&doc_chunks("a.pdf", &["one"])).await.unwrap();

        let removed = sync.remove_by_source("missing.pdf").await.unwrap();
        assert_eq!(removed, 0);
        assert_eq!(sync.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_upsert_names_the_chunk_ids() {
        // seed the store with two-dimensional entries so the fake
        // embedder's three-dimensional vectors get rejected
        let store = Arc::new(LocalVectorStore::in_memory());
        store
            .upsert(vec![crate::types::VectorEntry {
                id: "seed-0-1".to_string(),
                embedding: vec![1.0, 0.0],
                text: "seed".to_string(),
                metadata: crate::types::ChunkMetadata {
                    source: "seed".to_string(),
                    page: 0,
                },
            }])
            .await
            .unwrap();

        let sync = IndexSynchronizer::new(store, Arc::new(FakeEmbedder));
        let err = sync
            .sync(&doc_chunks("doc.pdf", &["first", "second"]))
            .await
            .unwrap_err();

        match err {
            Error::Index { failed_ids, .. } => {
                assert_eq!(failed_ids.len(), 2);
                assert!(failed_ids.contains(&"doc.pdf-0-1".to_string()));
            }
            other => panic!("expected index error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates_and_adds_nothing() {
        let sync = IndexSynchronizer::new(
            Arc::new(LocalVectorStore::in_memory()),
            Arc::new(FailingEmbedder),
        );
        let err = sync
            .sync(&doc_chunks("doc.pdf", &["first"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
        assert_eq!(sync.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_empties_the_store() {
        let sync = synchronizer();
        sync.sync(&doc_chunks("a.pdf", &["one"])).await.unwrap();
        sync.clear().await.unwrap();
        assert_eq!(sync.count().await.unwrap(), 0);
    }
}
