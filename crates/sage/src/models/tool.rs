use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes a tool to the model: what it is called, when to use it, and what it accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    /// The name of the tool, unique within a registry
    pub name: String,
    /// A description of what the tool does, used by the model to decide when to call it
    pub description: String,
    /// JSON schema of the arguments the tool accepts
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        ToolDescriptor {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// A request from the model to run a tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    /// Identifier assigned by the model, echoed back on the matching result
    pub id: String,
    /// The name of the tool to execute
    pub name: String,
    /// The arguments for the execution
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// The text produced for a single tool call, successful or not
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub content: String,
}

impl ToolResult {
    pub fn new<I: Into<String>, C: Into<String>>(tool_call_id: I, content: C) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }
}
