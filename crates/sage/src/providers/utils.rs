use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use crate::models::message::Message;
use crate::models::tool::{ToolCallRequest, ToolDescriptor};

lazy_static! {
    // Characters the chat-completions API rejects in function names
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_-]").expect("valid regex");
}

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| match message {
            Message::User { content, .. } => json!({
                "role": "user",
                "content": content,
            }),
            Message::AssistantFinal { content, .. } => json!({
                "role": "assistant",
                "content": content,
            }),
            Message::AssistantToolCalls {
                content,
                tool_calls,
                ..
            } => {
                let calls: Vec<Value> = tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": sanitize_function_name(&call.name),
                                "arguments": call.arguments.to_string(),
                            }
                        })
                    })
                    .collect();
                let mut converted = json!({
                    "role": "assistant",
                    "tool_calls": calls,
                });
                if !content.is_empty() {
                    converted["content"] = json!(content);
                }
                converted
            }
            Message::ToolResult {
                tool_call_id,
                content,
                ..
            } => json!({
                "role": "tool",
                "content": content,
                "tool_call_id": tool_call_id,
            }),
        })
        .collect()
}

/// Convert tool descriptors to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[ToolDescriptor]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        let name = sanitize_function_name(&tool.name);
        if !tool_names.insert(name.clone()) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("Response contained no choices"))?;

    let text = original
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or_default()
        .to_string();

    let mut tool_calls = Vec::new();
    if let Some(calls) = original.get("tool_calls").and_then(|c| c.as_array()) {
        for call in calls {
            let id = call["id"].as_str().unwrap_or_default().to_string();
            let name = call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let raw_arguments = call["function"]["arguments"].as_str().unwrap_or("{}");

            // Malformed arguments are kept verbatim, the tool then reports them as invalid
            let arguments = serde_json::from_str::<Value>(raw_arguments)
                .unwrap_or_else(|_| Value::String(raw_arguments.to_string()));

            tool_calls.push(ToolCallRequest::new(id, name, arguments));
        }
    }

    if tool_calls.is_empty() {
        Ok(Message::assistant(text))
    } else {
        Ok(Message::tool_calls(text, tool_calls))
    }
}

pub fn sanitize_function_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").to_string()
}

/// Whether a name can be sent to the model unchanged
pub fn is_valid_function_name(name: &str) -> bool {
    !name.is_empty() && !INVALID_NAME_CHARS.is_match(name)
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}

/// Rate limiting or a server-side failure; worth trying again
#[derive(Debug, thiserror::Error)]
#[error("Server error: {0}")]
pub struct ServerError(pub reqwest::StatusCode);

/// Whether an error from a provider call is worth retrying
pub fn is_transient(error: &anyhow::Error) -> bool {
    if error.downcast_ref::<ServerError>().is_some() {
        return true;
    }
    match error.downcast_ref::<reqwest::Error>() {
        Some(e) => e.is_timeout() || e.is_connect(),
        None => false,
    }
}
