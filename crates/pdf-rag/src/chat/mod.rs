//! Chat turn orchestration

use std::sync::Arc;

use tracing::debug;

use crate::conversation::ConversationStore;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider, VectorStoreProvider};
use crate::types::ChatMessage;

pub mod prompt;

pub use prompt::PromptBuilder;

/// Runs one chat turn: retrieve, prompt, complete, remember.
///
/// The conversation store keeps the user's raw question and the assistant
/// reply; the retrieval-augmented prompt is what the model sees as the
/// latest message but is never persisted. A turn that fails anywhere leaves
/// the history untouched.
pub struct ChatOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    llm: Arc<dyn LlmProvider>,
    conversations: Arc<dyn ConversationStore>,
    top_k: usize,
}

impl ChatOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        llm: Arc<dyn LlmProvider>,
        conversations: Arc<dyn ConversationStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            llm,
            conversations,
            top_k,
        }
    }

    /// Answer `user_text` on the given thread and record the exchange
    pub async fn converse(&self, thread_id: &str, user_text: &str) -> Result<String> {
        // snapshot before this turn so the model does not see the current
        // question twice (it arrives inside the prompt)
        let history = self.conversations.history(thread_id);

        let wrap = |cause: Error| Error::chat(thread_id, cause);

        let query_embedding = self.embedder.embed(user_text).await.map_err(wrap)?;
        let results = self
            .store
            .search(&query_embedding, self.top_k)
            .await
            .map_err(wrap)?;

        let context = PromptBuilder::build_context(&results);
        let sources = PromptBuilder::format_sources(&results);
        let prompt = PromptBuilder::build_chat_prompt(user_text, &context, &sources);

        debug!(
            thread_id,
            results = results.len(),
            history = history.len(),
            "Running chat turn"
        );

        let reply = self.llm.complete(&history, &prompt).await.map_err(wrap)?;

        self.conversations.append_exchange(
            thread_id,
            ChatMessage::user(user_text),
            ChatMessage::assistant(reply.clone()),
        );

        Ok(reply)
    }

    /// Snapshot of a thread's stored messages
    pub fn history(&self, thread_id: &str) -> Vec<ChatMessage> {
        self.conversations.history(thread_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::MemoryConversationStore;
    use crate::providers::LocalVectorStore;
    use crate::types::{ChunkMetadata, MessageRole, VectorEntry};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    /// Records every call and answers with a numbered reply
    #[derive(Default)]
    struct FakeLlm {
        calls: Mutex<Vec<(Vec<ChatMessage>, String)>>,
    }

    #[async_trait]
    impl LlmProvider for FakeLlm {
        async fn complete(&self, history: &[ChatMessage], prompt: &str) -> Result<String> {
            let mut calls = self.calls.lock();
            calls.push((history.to_vec(), prompt.to_string()));
            Ok(format!("reply {}", calls.len()))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmProvider for FailingLlm {
        async fn complete(&self, _history: &[ChatMessage], _prompt: &str) -> Result<String> {
            Err(Error::llm("model unavailable"))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn model(&self) -> &str {
            "none"
        }
    }

    async fn seeded_store() -> Arc<LocalVectorStore> {
        let store = Arc::new(LocalVectorStore::in_memory());
        store
            .upsert(vec![VectorEntry {
                id: "doc.pdf-0-1".to_string(),
                embedding: vec![10.0, 1.0],
                text: "Rust is a systems language.".to_string(),
                metadata: ChunkMetadata {
                    source: "doc.pdf".to_string(),
                    page: 0,
                },
            }])
            .await
            .unwrap();
        store
    }

    async fn orchestrator_with(llm: Arc<dyn LlmProvider>) -> ChatOrchestrator {
        ChatOrchestrator::new(
            Arc::new(FakeEmbedder),
            seeded_store().await,
            llm,
            Arc::new(MemoryConversationStore::new()),
            5,
        )
    }

    #[tokio::test]
    async fn test_two_turns_accumulate_four_messages() {
        let llm = Arc::new(FakeLlm::default());
        let orchestrator = orchestrator_with(llm.clone()).await;

        let first = orchestrator.converse("t1", "What is Rust?").await.unwrap();
        assert_eq!(first, "reply 1");
        let second = orchestrator.converse("t1", "Who uses it?").await.unwrap();
        assert_eq!(second, "reply 2");

        let history = orchestrator.history("t1");
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "What is Rust?");
        assert_eq!(history[1].content, "reply 1");
        assert_eq!(history[2].content, "Who uses it?");
        assert_eq!(history[3].content, "reply 2");
    }

    #[tokio::test]
    async fn test_model_sees_prior_history_but_not_current_question() {
        let llm = Arc::new(FakeLlm::default());
        let orchestrator = orchestrator_with(llm.clone()).await;

        orchestrator.converse("t1", "first question").await.unwrap();
        orchestrator.converse("t1", "second question").await.unwrap();

        let calls = llm.calls.lock();
        assert!(calls[0].0.is_empty());
        // second turn: the model's history is exactly the first exchange
        assert_eq!(calls[1].0.len(), 2);
        assert_eq!(calls[1].0[0].content, "first question");
        assert_eq!(calls[1].0[1].content, "reply 1");
    }

    #[tokio::test]
    async fn test_prompt_carries_context_but_history_stores_raw_question() {
        let llm = Arc::new(FakeLlm::default());
        let orchestrator = orchestrator_with(llm.clone()).await;

        orchestrator.converse("t1", "What is Rust?").await.unwrap();

        let calls = llm.calls.lock();
        let prompt = &calls[0].1;
        assert!(prompt.contains("Rust is a systems language."));
        assert!(prompt.contains("Source: doc.pdf, Pages: [1] | "));
        assert!(prompt.contains("Question:\nWhat is Rust?"));

        let history = orchestrator.history("t1");
        assert_eq!(history[0].content, "What is Rust?");
        assert!(!history[0].content.contains("Context:"));
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_history_untouched() {
        let orchestrator = orchestrator_with(Arc::new(FailingLlm)).await;

        let err = orchestrator.converse("t1", "hello?").await.unwrap_err();
        match err {
            Error::Chat { thread_id, .. } => assert_eq!(thread_id, "t1"),
            other => panic!("expected chat error, got {other:?}"),
        }
        assert!(orchestrator.history("t1").is_empty());
    }

    #[tokio::test]
    async fn test_threads_do_not_share_history() {
        let llm = Arc::new(FakeLlm::default());
        let orchestrator = orchestrator_with(llm.clone()).await;

        orchestrator.converse("alice", "question A").await.unwrap();
        orchestrator.converse("bob", "question B").await.unwrap();

        assert_eq!(orchestrator.history("alice").len(), 2);
        assert_eq!(orchestrator.history("bob").len(), 2);

        let calls = llm.calls.lock();
        // bob's turn must not see alice's exchange
        assert!(calls[1].0.is_empty());
    }
}
