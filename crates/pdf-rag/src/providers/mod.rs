//! Provider abstractions for embeddings, chat completion, and vector storage
//!
//! Trait-based seams so the Ollama-backed defaults can be swapped out or
//! faked in tests.

pub mod embedding;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use local::LocalVectorStore;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use vector_store::VectorStoreProvider;
