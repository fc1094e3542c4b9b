use colloquy_llm::{ChatClient, ChatRequest, Message};
use colloquy_store::ConversationStore;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::Instrument;

use crate::context::assemble_prompt;
use crate::error::{ChatError, Result};
use crate::settings::{ChatSettings, TurnPolicy};

/// One inbound chat turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub message: String,
    pub conversation_id: Option<String>,
}

impl ChatTurn {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }
}

/// Result of a completed turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub answer: String,
    pub model_id: String,
    pub conversation_id: String,
}

/// Use a caller-supplied identifier verbatim, or mint a new one.
///
/// No existence check and no format validation: an unseen identifier simply
/// starts a new conversation.
pub fn resolve_conversation_id(requested: Option<&str>) -> String {
    match requested {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => uuid::Uuid::new_v4().to_string(),
    }
}

/// Runs chat turns: read history, ask the model, record the exchange.
///
/// The store is only touched for the read and the final append; it is never
/// locked while the completion call is in flight.
pub struct ChatOrchestrator {
    store: Arc<dyn ConversationStore>,
    client: Arc<dyn ChatClient>,
    settings: ChatSettings,
    turn_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ChatOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        client: Arc<dyn ChatClient>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            store,
            client,
            settings,
            turn_locks: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Conversations with a turn currently queued or running under
    /// [`TurnPolicy::Serialize`]
    pub fn active_turns(&self) -> usize {
        self.turn_locks.len()
    }

    /// Handle one turn end to end.
    ///
    /// On [`ChatError::Upstream`] nothing is written to the store, so the
    /// caller may retry the whole turn.
    pub async fn handle(&self, turn: ChatTurn) -> Result<ChatReply> {
        if turn.message.trim().is_empty() {
            return Err(ChatError::InvalidInput("message must not be empty".to_string()));
        }

        let conversation_id = resolve_conversation_id(turn.conversation_id.as_deref());
        let span = tracing::info_span!("chat_turn", conversation_id = %conversation_id);

        async {
            match self.settings.turn_policy {
                TurnPolicy::Interleave => self.run_turn(&conversation_id, turn.message).await,
                TurnPolicy::Serialize => {
                    let slot = TurnSlot::acquire(&self.turn_locks, &conversation_id);
                    let _guard = slot.lock().await;
                    self.run_turn(&conversation_id, turn.message).await
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_turn(&self, conversation_id: &str, utterance: String) -> Result<ChatReply> {
        let history = self.store.read(conversation_id).await;
        tracing::debug!(history_len = history.len(), "Loaded conversation history");

        let user_message = Message::user(utterance);
        let prompt = assemble_prompt(&self.settings.system_prompt, history, user_message.clone());
        let request = ChatRequest::new(self.settings.model_id.clone(), prompt)
            .with_options(self.settings.options.clone());

        let response = self.client.chat(request).await.map_err(|e| {
            tracing::warn!(error = %format_args!("{e:#}"), "Completion failed, history left unchanged");
            ChatError::Upstream(e)
        })?;

        let assistant_message = response.into_message();
        let answer = assistant_message.content.clone();
        self.store
            .append(conversation_id, user_message, assistant_message)
            .await;

        tracing::info!(answer_len = answer.len(), "Chat turn completed");

        Ok(ChatReply {
            answer,
            model_id: self.settings.model_id.clone(),
            conversation_id: conversation_id.to_string(),
        })
    }
}

/// A conversation's place in the per-identifier turn queue.
///
/// The map entry is dropped once no turn holds or waits for it, including
/// when the turn future is cancelled.
struct TurnSlot<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    conversation_id: &'a str,
    lock: Option<Arc<Mutex<()>>>,
}

impl<'a> TurnSlot<'a> {
    fn acquire(locks: &'a DashMap<String, Arc<Mutex<()>>>, conversation_id: &'a str) -> Self {
        let lock = locks
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        Self {
            locks,
            conversation_id,
            lock: Some(lock),
        }
    }

    async fn lock(&self) -> Option<OwnedMutexGuard<()>> {
        let lock = self.lock.as_ref().map(Arc::clone)?;
        Some(lock.lock_owned().await)
    }
}

impl Drop for TurnSlot<'_> {
    fn drop(&mut self) {
        self.lock.take();
        // Only the map's own reference left: nobody is running or queued
        self.locks
            .remove_if(self.conversation_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
