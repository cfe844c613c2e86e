//! pdf-rag: document Q&A chat service over a private PDF corpus
//!
//! Uploaded PDFs are split into overlapping chunks with deterministic IDs,
//! diffed against the vector index so re-ingesting an unchanged document is
//! a no-op, and retrieved at chat time to ground the LLM's answers. Each
//! conversation thread keeps its own append-only history.

pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod types;

pub use chat::ChatOrchestrator;
pub use config::RagConfig;
pub use conversation::{ConversationStore, MemoryConversationStore};
pub use error::{Error, Result};
pub use index::IndexSynchronizer;
pub use ingestion::{ChunkSplitter, IngestPipeline, UploadOutcome};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Chunk};
