use colloquy_chat::ChatOrchestrator;
use colloquy_llm::ChatClient;
use colloquy_store::ConversationStore;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Built once at startup. The orchestrator holds its own handles to the
/// store and the completion client.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ConversationStore>,
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn ConversationStore>,
        llm_client: Arc<dyn ChatClient>,
    ) -> Self {
        let orchestrator =
            ChatOrchestrator::new(Arc::clone(&store), llm_client, config.chat_settings());

        Self {
            config: Arc::new(config),
            store,
            orchestrator: Arc::new(orchestrator),
        }
    }
}
