use async_trait::async_trait;
use colloquy_llm::Message;
use dashmap::DashMap;
use std::collections::VecDeque;
use tokio::time::Instant;

use crate::config::StoreConfig;
use crate::trait_store::ConversationStore;

struct Conversation {
    messages: VecDeque<Message>,
    last_active: Instant,
}

impl Conversation {
    fn new(now: Instant) -> Self {
        Self {
            messages: VecDeque::new(),
            last_active: now,
        }
    }
}

/// Process-local conversation store
///
/// Conversations live in a sharded map, so reads and appends on different
/// identifiers only contend when they hash to the same shard. Each read or
/// append on one identifier holds that entry's lock for its whole duration and
/// therefore observes either the state before or after a concurrent append.
/// Reads refresh the idle clock, so they take the entry's write lock too and
/// reads on one identifier serialize with each other.
pub struct InMemoryConversationStore {
    conversations: DashMap<String, Conversation>,
    config: StoreConfig,
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl InMemoryConversationStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            conversations: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn is_expired(&self, conversation: &Conversation, now: Instant) -> bool {
        self.config
            .idle_ttl
            .is_some_and(|ttl| now.duration_since(conversation.last_active) >= ttl)
    }

    /// Remove least recently active conversations until the capacity bound
    /// holds. `keep` is the conversation just written and is never chosen.
    fn enforce_capacity(&self, keep: &str) -> usize {
        let Some(max) = self.config.max_conversations else {
            return 0;
        };

        let mut evicted = 0;
        while self.conversations.len() > max {
            let oldest = self
                .conversations
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().last_active)
                .map(|entry| entry.key().clone());

            let Some(key) = oldest else {
                break;
            };
            if self.conversations.remove(&key).is_some() {
                tracing::debug!(conversation_id = %key, "Evicted conversation over capacity");
                evicted += 1;
            }
        }
        evicted
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn read(&self, conversation_id: &str) -> Vec<Message> {
        let now = Instant::now();
        let Some(mut conversation) = self.conversations.get_mut(conversation_id) else {
            return Vec::new();
        };

        // Left for the sweeper; the next append starts over.
        if self.is_expired(&conversation, now) {
            return Vec::new();
        }

        conversation.last_active = now;
        conversation.messages.iter().cloned().collect()
    }

    async fn append(&self, conversation_id: &str, user: Message, assistant: Message) {
        let now = Instant::now();
        let mut created = false;

        {
            let mut conversation = self
                .conversations
                .entry(conversation_id.to_string())
                .or_insert_with(|| {
                    created = true;
                    Conversation::new(now)
                });

            if self.is_expired(&conversation, now) {
                conversation.messages.clear();
            }

            conversation.messages.push_back(user);
            conversation.messages.push_back(assistant);
            while conversation.messages.len() > self.config.max_history_messages {
                conversation.messages.pop_front();
            }
            conversation.last_active = now;
        }

        if created {
            self.enforce_capacity(conversation_id);
        }
    }

    async fn conversation_count(&self) -> usize {
        self.conversations.len()
    }

    async fn evict_expired(&self) -> usize {
        let Some(ttl) = self.config.idle_ttl else {
            return 0;
        };

        let now = Instant::now();
        let mut evicted = 0;
        self.conversations.retain(|key, conversation| {
            let keep = now.duration_since(conversation.last_active) < ttl;
            if !keep {
                tracing::debug!(conversation_id = %key, "Evicted idle conversation");
                evicted += 1;
            }
            keep
        });
        evicted
    }
}
