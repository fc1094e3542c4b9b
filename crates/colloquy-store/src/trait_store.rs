use async_trait::async_trait;
use colloquy_llm::Message;

/// Trait for conversation history storage
///
/// Implementations own every conversation's message sequence. Only user and
/// assistant messages are stored; each sequence is trimmed to the configured
/// cap after every append. None of the operations fail: an unknown
/// identifier is a conversation that has not started yet.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Current history for a conversation, oldest first. Empty if unknown.
    async fn read(&self, conversation_id: &str) -> Vec<Message>;

    /// Append one user message then one assistant message, then trim to the cap.
    ///
    /// This is an append, not a set: repeating a call grows the history again.
    async fn append(&self, conversation_id: &str, user: Message, assistant: Message);

    /// Number of conversations currently tracked
    async fn conversation_count(&self) -> usize;

    /// Drop conversations past their idle TTL, returning how many were removed
    async fn evict_expired(&self) -> usize;
}
