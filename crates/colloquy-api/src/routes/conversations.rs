use axum::{
    extract::{Path, State},
    Json,
};
use colloquy_llm::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// `user` or `assistant`
    pub role: String,
    pub content: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub messages: Vec<MessageResponse>,
}

/// Retained history of a conversation, oldest first
///
/// Unknown identifiers yield an empty list rather than 404, the same view a
/// new chat turn would get.
#[utoipa::path(
    get,
    path = "/conversations/{conversation_id}",
    params(
        ("conversation_id" = String, Path, description = "Conversation identifier")
    ),
    responses(
        (status = 200, description = "Conversation history", body = ConversationResponse)
    ),
    tag = "conversations"
)]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
) -> Json<ConversationResponse> {
    let messages = state
        .store
        .read(&conversation_id)
        .await
        .into_iter()
        .map(MessageResponse::from)
        .collect();

    Json(ConversationResponse {
        conversation_id,
        messages,
    })
}
