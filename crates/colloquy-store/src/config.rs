use std::time::Duration;

/// Messages kept per conversation (user and assistant combined)
pub const DEFAULT_MAX_HISTORY_MESSAGES: usize = 20;

/// Limits applied by a conversation store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Most recent messages retained per conversation; older ones are dropped first
    pub max_history_messages: usize,

    /// Conversations idle for at least this long are treated as gone
    pub idle_ttl: Option<Duration>,

    /// Upper bound on tracked conversations; least recently active go first
    pub max_conversations: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_history_messages: DEFAULT_MAX_HISTORY_MESSAGES,
            idle_ttl: None,
            max_conversations: None,
        }
    }
}

impl StoreConfig {
    pub fn new(max_history_messages: usize) -> Self {
        Self {
            max_history_messages,
            ..Self::default()
        }
    }

    pub fn idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = Some(ttl);
        self
    }

    pub fn max_conversations(mut self, max: usize) -> Self {
        self.max_conversations = Some(max);
        self
    }
}
