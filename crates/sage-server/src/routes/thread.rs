use crate::routes::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use sage::models::message::Message;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThreadResponse {
    thread_id: String,
    messages: Vec<Message>,
}

async fn handler(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<ThreadResponse>, ApiError> {
    let messages = state
        .chat
        .store()
        .snapshot(&thread_id)
        .await
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id.clone()))?;
    Ok(Json(ThreadResponse {
        thread_id,
        messages,
    }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/threads/:thread_id", get(handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::configure;
    use crate::routes::test_support::{json_body, state};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use sage::providers::mock::MockProvider;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_thread_history_after_chat() {
        let provider = MockProvider::new(vec![Message::assistant("Hi!")]);
        let app = configure(state(&provider));

        let chat = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"message": "Hello", "threadId": "t-1"}).to_string()))
            .unwrap();
        let response = app.clone().oneshot(chat).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/threads/t-1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["threadId"], "t-1");
        assert_eq!(body["messages"][0]["kind"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
        assert_eq!(body["messages"][1]["kind"], "assistant_final");
        assert_eq!(body["messages"][1]["content"], "Hi!");
    }

    #[tokio::test]
    async fn test_unknown_thread() {
        let provider = MockProvider::new(vec![]);
        let response = routes(state(&provider))
            .oneshot(Request::builder().uri("/threads/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Thread not found");
    }
}
