use axum::{extract::State, Json};
use colloquy_chat::ChatTurn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequestBody {
    /// The user's utterance
    pub message: String,
    /// Continue an existing conversation; omitted or empty starts a new one
    #[serde(default, alias = "conversationId")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponseBody {
    pub answer: String,
    pub model_id: String,
    pub conversation_id: String,
}

/// Run one chat turn
///
/// The turn runs on its own task, so a client that disconnects mid-request
/// does not lose the exchange: the reply is still recorded in the
/// conversation.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequestBody,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponseBody),
        (status = 400, description = "Empty message"),
        (status = 502, description = "Completion service failed")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequestBody>,
) -> ApiResult<Json<ChatResponseBody>> {
    let mut turn = ChatTurn::new(req.message);
    turn.conversation_id = req.conversation_id;

    let orchestrator = Arc::clone(&state.orchestrator);
    let reply = tokio::spawn(async move { orchestrator.handle(turn).await })
        .await
        .map_err(|e| ApiError::Internal(format!("chat turn task failed: {e}")))??;

    Ok(Json(ChatResponseBody {
        answer: reply.answer,
        model_id: reply.model_id,
        conversation_id: reply.conversation_id,
    }))
}
