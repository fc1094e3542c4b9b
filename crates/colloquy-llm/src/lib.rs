pub mod types;
pub mod traits;
pub mod openai;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions, TokenUsage};
pub use openai::{OpenAICompatibleClient, OpenAICompatibleClientBuilder};
pub use types::{Message, Role};
