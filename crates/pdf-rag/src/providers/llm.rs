//! Chat completion provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChatMessage;

/// Trait for history-aware chat completion
///
/// The production implementation is `OllamaLlm`. The model sees the prior
/// conversation followed by `prompt` as the latest user message, so callers
/// decide what the "current" message looks like (for this service, the
/// retrieval-augmented prompt rather than the raw question).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a conversation: prior history plus `prompt` as the newest
    /// user turn. Returns the assistant reply text.
    async fn complete(&self, history: &[ChatMessage], prompt: &str) -> Result<String>;

    /// Check whether the backing service is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// The model in use
    fn model(&self) -> &str;
}
