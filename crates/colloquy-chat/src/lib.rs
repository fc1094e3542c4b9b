mod context;
mod error;
mod orchestrator;
mod settings;

pub use context::{assemble_prompt, ContextWindow};
pub use error::ChatError;
pub use orchestrator::{resolve_conversation_id, ChatOrchestrator, ChatReply, ChatTurn};
pub use settings::{ChatSettings, TurnPolicy, DEFAULT_MODEL_ID, DEFAULT_SYSTEM_PROMPT};
