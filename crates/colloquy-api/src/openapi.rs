use axum::Json;
use utoipa::OpenApi;

use crate::handlers::chat::{ChatRequestBody, ChatResponseBody};
use crate::routes::conversations::{ConversationResponse, MessageResponse};
use crate::routes::health::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::chat::chat,
        crate::routes::health::health_check,
        crate::routes::conversations::get_conversation,
    ),
    components(schemas(
        ChatRequestBody,
        ChatResponseBody,
        HealthResponse,
        ConversationResponse,
        MessageResponse,
    )),
    tags(
        (name = "chat", description = "Multi-turn chat backed by an OpenAI-compatible completion endpoint"),
        (name = "conversations", description = "Inspect retained conversation history"),
        (name = "health", description = "Service status"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
