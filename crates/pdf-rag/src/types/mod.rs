//! Core data types

pub mod chat;
pub mod document;

pub use chat::{ChatMessage, ChatRequest, ChatResponse, MessageRole};
pub use document::{Chunk, ChunkMetadata, PageText, ScoredChunk, VectorEntry};
