//! API routes for the RAG server

pub mod chat;
pub mod pdfs;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Chat
        .route("/chat", post(chat::chat))
        .route("/conversation/:thread_id", get(chat::get_conversation))
        // PDF corpus
        .route("/pdfs", get(pdfs::list_pdfs))
        .route("/pdfs/:name", get(pdfs::get_pdf))
        // Upload - with larger body limit for multipart
        .route(
            "/upload/pdf",
            post(pdfs::upload_pdfs).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        // Removal
        .route("/remove/pdf/:name", delete(pdfs::remove_pdf))
        .route("/remove/pdfs", delete(pdfs::remove_all_pdfs))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "pdf-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document Q&A over a private PDF corpus",
        "endpoints": {
            "POST /chat": "Ask a question on a conversation thread",
            "GET /conversation/:thread_id": "Fetch a thread's message history",
            "GET /pdfs": "List stored PDF files",
            "GET /pdfs/:name": "Download a stored PDF",
            "POST /upload/pdf": "Upload and index PDF files (multipart)",
            "DELETE /remove/pdf/:name": "Remove one PDF and its indexed chunks",
            "DELETE /remove/pdfs": "Remove every PDF and its indexed chunks"
        }
    }))
}
