//! Chat and conversation endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// A thread's stored messages
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
}

/// POST /chat - Run one chat turn on a thread
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    tracing::info!(thread_id = %request.thread_id, "Chat: \"{}\"", request.message);

    let response = state
        .orchestrator()
        .converse(&request.thread_id, &request.message)
        .await?;

    Ok(Json(ChatResponse {
        response,
        thread_id: request.thread_id,
    }))
}

/// GET /conversation/:thread_id - Fetch a thread's history.
///
/// An unknown thread answers with an empty message list, not a 404.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Json<ConversationResponse> {
    let messages = state.conversations().history(&thread_id);

    Json(ConversationResponse {
        thread_id,
        messages,
    })
}
