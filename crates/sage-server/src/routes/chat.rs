use crate::routes::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Documents are cut down to a short prefix by the handler, so the body may be large
const MAX_CHAT_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    thread_id: Option<String>,
    #[serde(default)]
    document_content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    response: String,
    success: bool,
    thread_id: String,
}

async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    // Each request without a thread id starts its own conversation
    let thread_id = request
        .thread_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!(thread_id = %thread_id, "chat request");

    let response = state
        .chat
        .handle(
            &thread_id,
            request.message.as_deref(),
            request.document_content.as_deref(),
        )
        .await?;

    Ok(Json(ChatResponse {
        response,
        success: true,
        thread_id,
    }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handler))
        .layer(DefaultBodyLimit::max(MAX_CHAT_BODY_BYTES))
        .with_state(state)
}
