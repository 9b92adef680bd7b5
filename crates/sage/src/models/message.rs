use super::role::Role;
use super::tool::{ToolCallRequest, ToolResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A message in a conversation history.
///
/// The variants are closed on purpose: the agent loop matches on them exhaustively
/// instead of probing optional fields, so a new kind of message is a compile error
/// everywhere it needs handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// Text written by the user, possibly with a document excerpt folded in
    User { created: i64, content: String },
    /// A direct answer from the model, which ends a reply
    AssistantFinal { created: i64, content: String },
    /// The model asking for one or more tools to run; `content` is optional preamble text
    AssistantToolCalls {
        created: i64,
        content: String,
        tool_calls: Vec<ToolCallRequest>,
    },
    /// The output of a single tool call, always text
    ToolResult {
        created: i64,
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    /// Create a new user message with the current timestamp
    pub fn user<S: Into<String>>(content: S) -> Self {
        Message::User {
            created: Utc::now().timestamp(),
            content: content.into(),
        }
    }

    /// Create a final assistant answer with the current timestamp
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Message::AssistantFinal {
            created: Utc::now().timestamp(),
            content: content.into(),
        }
    }

    /// Create an assistant message requesting tool calls
    pub fn tool_calls<S: Into<String>>(content: S, tool_calls: Vec<ToolCallRequest>) -> Self {
        Message::AssistantToolCalls {
            created: Utc::now().timestamp(),
            content: content.into(),
            tool_calls,
        }
    }

    /// Create a tool message carrying the result of one call
    pub fn tool_result(result: ToolResult) -> Self {
        Message::ToolResult {
            created: Utc::now().timestamp(),
            tool_call_id: result.tool_call_id,
            content: result.content,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::User { .. } => Role::User,
            Message::AssistantFinal { .. } | Message::AssistantToolCalls { .. } => Role::Assistant,
            Message::ToolResult { .. } => Role::Tool,
        }
    }

    pub fn created(&self) -> i64 {
        match self {
            Message::User { created, .. }
            | Message::AssistantFinal { created, .. }
            | Message::AssistantToolCalls { created, .. }
            | Message::ToolResult { created, .. } => *created,
        }
    }

    /// The text carried by the message, empty for tool requests without preamble
    pub fn text(&self) -> &str {
        match self {
            Message::User { content, .. }
            | Message::AssistantFinal { content, .. }
            | Message::AssistantToolCalls { content, .. }
            | Message::ToolResult { content, .. } => content,
        }
    }

    /// Tool calls requested by this message, empty unless it is an `AssistantToolCalls`
    pub fn requested_tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            Message::AssistantToolCalls { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            Message::ToolResult { tool_call_id, .. } => Some(tool_call_id),
            _ => None,
        }
    }
}
