//! Per-thread conversation history

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::types::ChatMessage;

/// Append-only conversation memory keyed by thread ID.
///
/// Reading an unknown thread returns an empty history and does not create
/// the thread. `append_exchange` publishes a user/assistant pair atomically
/// so concurrent turns on the same thread never interleave inside a pair.
pub trait ConversationStore: Send + Sync {
    /// Append one message to a thread, creating the thread if needed
    fn append(&self, thread_id: &str, message: ChatMessage);

    /// Append a user/assistant pair with nothing in between
    fn append_exchange(&self, thread_id: &str, user: ChatMessage, assistant: ChatMessage);

    /// Snapshot of a thread's messages in insertion order
    fn history(&self, thread_id: &str) -> Vec<ChatMessage>;
}

/// In-memory conversation store.
///
/// Each thread owns its own mutex, so turns on different threads never
/// contend with each other.
#[derive(Default)]
pub struct MemoryConversationStore {
    threads: DashMap<String, Arc<Mutex<Vec<ChatMessage>>>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The thread's message list, created on first use. The map shard lock
    /// is released before the caller locks the returned mutex.
    fn thread(&self, thread_id: &str) -> Arc<Mutex<Vec<ChatMessage>>> {
        self.threads
            .entry(thread_id.to_string())
            .or_default()
            .clone()
    }
}

impl ConversationStore for MemoryConversationStore {
    fn append(&self, thread_id: &str, message: ChatMessage) {
        self.thread(thread_id).lock().push(message);
    }

    fn append_exchange(&self, thread_id: &str, user: ChatMessage, assistant: ChatMessage) {
        let thread = self.thread(thread_id);
        let mut messages = thread.lock();
        messages.push(user);
        messages.push(assistant);
    }

    fn history(&self, thread_id: &str) -> Vec<ChatMessage> {
        match self.threads.get(thread_id) {
            Some(thread) => thread.lock().clone(),
            None => Vec::new(),
        }
    }
}
