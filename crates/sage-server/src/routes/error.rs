use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sage::errors::AgentError;
use serde_json::json;

/// Errors returned to HTTP callers as `{ error, details }`
///
/// Upstream failure text is logged, never echoed back.
#[derive(Debug)]
pub enum ApiError {
    Agent(AgentError),
    BadRequest(String),
    ThreadNotFound(String),
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        ApiError::Agent(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::Agent(AgentError::InvalidInput(reason)) => (
                StatusCode::BAD_REQUEST,
                reason,
                "Send a message, a document, or both".to_string(),
            ),
            ApiError::Agent(err) => {
                tracing::error!(error = %err, "failed to process message");
                let details = match err {
                    AgentError::ModelInvocation(_) => "The language model could not be reached",
                    _ => "An unexpected error occurred",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process message".to_string(),
                    details.to_string(),
                )
            }
            ApiError::BadRequest(details) => (
                StatusCode::BAD_REQUEST,
                "Invalid request body".to_string(),
                details,
            ),
            ApiError::ThreadNotFound(thread_id) => (
                StatusCode::NOT_FOUND,
                "Thread not found".to_string(),
                format!("No conversation with id {}", thread_id),
            ),
        };

        (status, Json(json!({ "error": error, "details": details }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::json_body;

    #[tokio::test]
    async fn test_invalid_input_is_client_error() {
        let response = ApiError::from(AgentError::InvalidInput(
            "Message or document is required".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Message or document is required");
    }

    #[tokio::test]
    async fn test_upstream_text_is_not_exposed() {
        let response = ApiError::from(AgentError::ModelInvocation(
            "Request failed: 401 secret-key-xyz".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to process message");
        assert!(!body.to_string().contains("secret-key-xyz"));
    }
}
