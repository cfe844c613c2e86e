//! Application state for the RAG server

use std::sync::Arc;

use parking_lot::RwLock;

use crate::chat::ChatOrchestrator;
use crate::config::RagConfig;
use crate::conversation::{ConversationStore, MemoryConversationStore};
use crate::error::Result;
use crate::index::IndexSynchronizer;
use crate::ingestion::{ChunkSplitter, IngestPipeline};
use crate::providers::{
    EmbeddingProvider, LlmProvider, LocalVectorStore, OllamaClient, OllamaEmbedder, OllamaLlm,
    VectorStoreProvider,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Embedding provider
    embedder: Arc<dyn EmbeddingProvider>,
    /// LLM provider
    llm: Arc<dyn LlmProvider>,
    /// Vector store
    vector_store: Arc<dyn VectorStoreProvider>,
    /// Diff-based index updates and source-scoped removal
    synchronizer: Arc<IndexSynchronizer>,
    /// Per-thread conversation history
    conversations: Arc<dyn ConversationStore>,
    /// Chat turn orchestration
    orchestrator: ChatOrchestrator,
    /// Upload/ingestion workflow
    pipeline: IngestPipeline,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Wire up providers, index, conversation memory, and workflows
    pub async fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;

        tracing::info!("Initializing application state...");

        std::fs::create_dir_all(&config.storage.pdf_dir)?;

        let vector_store: Arc<dyn VectorStoreProvider> =
            Arc::new(LocalVectorStore::from_config(&config.storage)?);
        tracing::info!(
            store = vector_store.name(),
            indexed = vector_store.count().await?,
            "Vector store initialized"
        );

        let client = Arc::new(OllamaClient::new(&config.llm));
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::from_client(
            Arc::clone(&client),
            config.llm.embed_dimensions,
            config.llm.embed_model.clone(),
        ));
        let llm: Arc<dyn LlmProvider> = Arc::new(OllamaLlm::from_client(
            Arc::clone(&client),
            config.llm.chat_model.clone(),
        ));
        tracing::info!(
            embed_model = %config.llm.embed_model,
            chat_model = %config.llm.chat_model,
            "Ollama providers initialized"
        );

        let synchronizer = Arc::new(IndexSynchronizer::new(
            Arc::clone(&vector_store),
            Arc::clone(&embedder),
        ));

        let conversations: Arc<dyn ConversationStore> = Arc::new(MemoryConversationStore::new());

        let orchestrator = ChatOrchestrator::new(
            Arc::clone(&embedder),
            Arc::clone(&vector_store),
            Arc::clone(&llm),
            Arc::clone(&conversations),
            config.retrieval.top_k,
        );

        let splitter = ChunkSplitter::from_config(&config.chunking)?;
        let pipeline = IngestPipeline::new(splitter, Arc::clone(&synchronizer));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                embedder,
                llm,
                vector_store,
                synchronizer,
                conversations,
                orchestrator,
                pipeline,
                ready: RwLock::new(true),
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get embedding provider
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get LLM provider
    pub fn llm_provider(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Get vector store provider
    pub fn vector_store_provider(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.inner.vector_store
    }

    /// Get index synchronizer
    pub fn synchronizer(&self) -> &Arc<IndexSynchronizer> {
        &self.inner.synchronizer
    }

    /// Get conversation store
    pub fn conversations(&self) -> &Arc<dyn ConversationStore> {
        &self.inner.conversations
    }

    /// Get chat orchestrator
    pub fn orchestrator(&self) -> &ChatOrchestrator {
        &self.inner.orchestrator
    }

    /// Get ingestion pipeline
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
