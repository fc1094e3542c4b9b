use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub model_id: String,
    pub base_url: String,
    /// Conversations currently held in memory
    pub conversations: usize,
}

/// Health check endpoint
///
/// Reports the configured model and completion endpoint. The completion
/// service itself is not contacted.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_id: state.orchestrator.settings().model_id.clone(),
        base_url: state.config.llm.base_url.clone(),
        conversations: state.store.conversation_count().await,
    })
}
