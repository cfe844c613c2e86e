//! Document, chunk, and vector entry types

use serde::{Deserialize, Serialize};

/// Text extracted from one page of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 0-based page number
    pub page: u32,
    /// Extracted text content
    pub text: String,
}

impl PageText {
    /// Create a new page
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// Metadata persisted with every vector entry; the parts of a chunk the
/// index layer relies on for diffing and source-scoped deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Stable identifier of the originating document (stored file name)
    pub source: String,
    /// 0-based page number (0 when the loader could not attribute a page)
    pub page: u32,
}

/// A contiguous span of text extracted from one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Originating document
    pub source: String,
    /// 0-based page number
    pub page: u32,
    /// 1-based ordinal within this chunk's (source, page) run; 0 until assigned
    #[serde(default)]
    pub section_index: u32,
    /// Text content
    pub text: String,
    /// Deterministic identifier `{source}-{page}-{section_index}`; empty until assigned
    #[serde(default)]
    pub id: String,
}

impl Chunk {
    /// Create a chunk with identity fields unassigned
    pub fn new(source: impl Into<String>, page: u32, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page,
            section_index: 0,
            text: text.into(),
            id: String::new(),
        }
    }

    /// Metadata persisted alongside this chunk's vector
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            source: self.source.clone(),
            page: self.page,
        }
    }
}

/// The persisted unit in the vector index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorEntry {
    /// Chunk ID (see `ingestion::identity`)
    pub id: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// Raw chunk text
    pub text: String,
    /// Source and page
    pub metadata: ChunkMetadata,
}

/// A retrieval hit: chunk text, its metadata, and the relevance score
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Raw chunk text
    pub text: String,
    /// Source and page
    pub metadata: ChunkMetadata,
    /// Relevance score (higher is more relevant)
    pub score: f32,
}
