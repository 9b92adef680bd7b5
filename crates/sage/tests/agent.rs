use sage::agent::{Agent, AgentLimits};
use sage::chat::ChatHandler;
use sage::models::message::Message;
use sage::providers::configs::{OpenAiProviderConfig, ProviderConfig, GROQ_MODEL};
use sage::providers::factory::get_retrying_provider;
use sage::store::ConversationStore;
use sage::tools::{ToolRegistry, ToolsConfig};
use serde_json::json;
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn handler(server: &MockServer) -> ChatHandler {
    let provider = get_retrying_provider(
        ProviderConfig::Groq(OpenAiProviderConfig {
            host: server.uri(),
            api_key: "gsk-test".to_string(),
            model: GROQ_MODEL.to_string(),
            temperature: Some(0.0),
            max_tokens: None,
        }),
        2,
    )
    .unwrap();
    let tools = ToolsConfig {
        exchange_rate_host: server.uri(),
        countries_host: server.uri(),
        ..ToolsConfig::default()
    };
    let registry = ToolRegistry::builtin(&tools).unwrap();
    let agent = Agent::new(provider, registry).unwrap().with_limits(AgentLimits {
        max_tool_rounds: 4,
        tool_timeout: Duration::from_secs(5),
    });
    ChatHandler::new(agent, ConversationStore::init())
}

fn completion(message: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 120, "completion_tokens": 20, "total_tokens": 140}
    }))
}

#[tokio::test]
async fn tool_round_trip_over_http() {
    let server = MockServer::start().await;

    // first model call asks for two tools at once
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [
                {
                    "id": "call_fx",
                    "type": "function",
                    "function": {
                        "name": "currency_conversion",
                        "arguments": "{\"amount\": 100, \"from_currency\": \"USD\", \"to_currency\": \"EUR\"}"
                    }
                },
                {
                    "id": "call_jp",
                    "type": "function",
                    "function": {"name": "country_info", "arguments": "{\"country\": \"Japan\"}"}
                }
            ]
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    // the follow-up call must carry both results, in request order
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system"},
                {"role": "user", "content": "100 USD in EUR, and the capital of Japan?"},
                {"role": "assistant"},
                {"role": "tool", "tool_call_id": "call_fx", "content": "100 USD = 92.00 EUR"},
                {"role": "tool", "tool_call_id": "call_jp"}
            ]
        })))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": "100 USD is 92.00 EUR, and Japan's capital is Tokyo."
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v4/latest/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rates": {"EUR": 0.92}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3.1/name/Japan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "name": {"common": "Japan"},
            "capital": ["Tokyo"],
            "population": 125836021,
            "region": "Asia",
            "languages": {"jpn": "Japanese"}
        }])))
        .mount(&server)
        .await;

    let handler = handler(&server);
    let answer = assert_ok!(
        handler
            .handle(
                "trip",
                Some("100 USD in EUR, and the capital of Japan?"),
                None
            )
            .await
    );
    assert_eq!(answer, "100 USD is 92.00 EUR, and Japan's capital is Tokyo.");

    let history = handler.store().snapshot("trip").await.unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[1].requested_tool_calls().len(), 2);
    assert!(history[4].text().contains("Tokyo"));
    assert!(matches!(history[4], Message::AssistantFinal { .. }));
}

#[tokio::test]
async fn transient_model_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(json!({"role": "assistant", "content": "Hello again."})))
        .with_priority(2)
        .mount(&server)
        .await;

    let handler = handler(&server);
    let answer = handler.handle("retry", Some("Hi"), None).await.unwrap();
    assert_eq!(answer, "Hello again.");
}

#[tokio::test]
async fn permanent_model_errors_fail_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handler = handler(&server);
    let err = handler.handle("denied", Some("Hi"), None).await.unwrap_err();
    assert!(!err.is_client_error());

    // no step finished, so the user message is not stored either
    let history = handler.store().snapshot("denied").await.unwrap();
    assert!(history.is_empty());
}
