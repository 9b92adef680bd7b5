use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Whether the caller sent something we can never act on, as opposed to a failure on our side
    pub fn is_client_error(&self) -> bool {
        matches!(self, AgentError::InvalidInput(_))
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AgentError::InvalidInput("empty".into()).is_client_error());
        assert!(!AgentError::ModelInvocation("down".into()).is_client_error());
        assert!(!AgentError::Internal("oops".into()).is_client_error());
    }

    #[test]
    fn test_display() {
        let err = AgentError::ToolNotFound("teleport".into());
        assert_eq!(err.to_string(), "Tool not found: teleport");
    }
}
