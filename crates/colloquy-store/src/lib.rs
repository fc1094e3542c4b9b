pub mod config;
pub mod trait_store;
pub mod memory;

pub use config::{StoreConfig, DEFAULT_MAX_HISTORY_MESSAGES};
pub use trait_store::ConversationStore;
pub use memory::InMemoryConversationStore;
