use colloquy_llm::ChatOptions;
use serde::Deserialize;

pub const DEFAULT_MODEL_ID: &str = "llama-32-8b-instruct";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer briefly, clearly and politely. \
You can use previous turns in the conversation to stay on topic.";

/// How concurrent turns that share a conversation identifier are ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPolicy {
    /// One turn at a time per conversation, in arrival order. Turns on
    /// other conversations are unaffected.
    #[default]
    Serialize,

    /// Turns run concurrently; each append is atomic but pairs may land in
    /// either order.
    Interleave,
}

/// Process-wide settings, fixed at startup
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model_id: String,
    pub system_prompt: String,
    pub options: ChatOptions,
    pub turn_policy: TurnPolicy,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            options: ChatOptions::default(),
            turn_policy: TurnPolicy::default(),
        }
    }
}

impl ChatSettings {
    pub fn new(model_id: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            system_prompt: system_prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_turn_policy(mut self, turn_policy: TurnPolicy) -> Self {
        self.turn_policy = turn_policy;
        self
    }
}
