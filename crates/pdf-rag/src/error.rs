//! Error types for the PDF RAG service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration (splitter parameters, config file, bind address)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Vector index upsert/delete failure, naming the affected chunk IDs
    #[error("Index update failed for {} chunk(s) [{}]: {message}", .failed_ids.len(), .failed_ids.join(", "))]
    Index {
        failed_ids: Vec<String>,
        message: String,
    },

    /// Retrieval or LLM failure during a chat turn
    #[error("Chat turn failed for thread '{thread_id}': {cause}")]
    Chat {
        thread_id: String,
        #[source]
        cause: Box<Error>,
    },

    /// Unknown document/source
    #[error("Not found: {0}")]
    NotFound(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector store error
    #[error("Vector store error: {0}")]
    VectorDb(String),

    /// Ollama/LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an index error naming the chunk IDs that failed
    pub fn index(failed_ids: Vec<String>, message: impl Into<String>) -> Self {
        Self::Index {
            failed_ids,
            message: message.into(),
        }
    }

    /// Wrap a failure that occurred during a chat turn
    pub fn chat(thread_id: impl Into<String>, cause: Error) -> Self {
        Self::Chat {
            thread_id: thread_id.into(),
            cause: Box::new(cause),
        }
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector store error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Configuration(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::Index { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "index_error",
                self.to_string(),
            ),
            Error::Chat { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "chat_error",
                self.to_string(),
            ),
            Error::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Not found: {}", what),
            ),
            Error::FileParse { filename, message } => (
                StatusCode::BAD_REQUEST,
                "parse_error",
                format!("Failed to parse '{}': {}", filename, message),
            ),
            Error::UnsupportedFileType(ext) => (
                StatusCode::BAD_REQUEST,
                "unsupported_type",
                format!("Unsupported file type: {}", ext),
            ),
            Error::Embedding(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error", msg.clone())
            }
            Error::VectorDb(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "vector_db_error", msg.clone())
            }
            Error::Llm(msg) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error", msg.clone()),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_names_failed_ids() {
        let err = Error::index(
            vec!["doc.pdf-0-1".to_string(), "doc.pdf-0-2".to_string()],
            "dimension mismatch",
        );
        let msg = err.to_string();
        assert!(msg.contains("doc.pdf-0-1"));
        assert!(msg.contains("doc.pdf-0-2"));
        assert!(msg.contains("dimension mismatch"));
    }

    #[test]
    fn test_chat_error_names_thread_and_cause() {
        let err = Error::chat("t1", Error::llm("connection refused"));
        let msg = err.to_string();
        assert!(msg.contains("t1"));
        assert!(msg.contains("connection refused"));
    }
}
