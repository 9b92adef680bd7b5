//! Tools the model can call, and the registry that resolves them by name.
//!
//! Every tool answers with text. Failures that a user could reasonably cause (an unknown city,
//! an unsupported currency, a provider outage) are rendered as descriptive text by the tool
//! itself; anything that still escapes as an `AgentError` is folded into text by [`call_tool`].
//! Nothing a tool does can abort a reply.
mod country;
mod currency;
mod encyclopedia;
pub mod registry;
mod search;
mod weather;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::ToolDescriptor;

pub use country::CountryInfoTool;
pub use currency::CurrencyConversionTool;
pub use encyclopedia::EncyclopediaTool;
pub use registry::ToolRegistry;
pub use search::{SearchTool, SearchTopic};
pub use weather::WeatherTool;

pub const TAVILY_HOST: &str = "https://api.tavily.com";
pub const WIKIPEDIA_HOST: &str = "https://en.wikipedia.org";
pub const GEOCODING_HOST: &str = "https://geocoding-api.open-meteo.com";
pub const WEATHER_HOST: &str = "https://api.open-meteo.com";
pub const EXCHANGE_RATE_HOST: &str = "https://api.exchangerate-api.com";
pub const COUNTRIES_HOST: &str = "https://restcountries.com";

/// A capability the model can invoke by name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and input schema shown to the model
    fn descriptor(&self) -> &ToolDescriptor;

    /// Run the tool. Errors are reserved for arguments the tool cannot interpret
    async fn execute(&self, arguments: Value) -> AgentResult<String>;

    fn name(&self) -> &str {
        &self.descriptor().name
    }
}

/// Invoke a tool and always come back with text
pub async fn call_tool(tool: &dyn Tool, arguments: Value) -> String {
    tracing::info!(tool = tool.name(), arguments = %arguments, "invoking tool");
    match tool.execute(arguments).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(tool = tool.name(), error = %e, "tool call failed");
            e.to_string()
        }
    }
}

/// Deserialize tool arguments into their typed form
pub(crate) fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> AgentResult<T> {
    serde_json::from_value(arguments).map_err(|e| AgentError::InvalidParameters(e.to_string()))
}

/// Where the built-in tools find their data
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    pub tavily_api_key: Option<String>,
    pub tavily_host: String,
    pub wikipedia_host: String,
    pub geocoding_host: String,
    pub weather_host: String,
    pub exchange_rate_host: String,
    pub countries_host: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            tavily_host: TAVILY_HOST.to_string(),
            wikipedia_host: WIKIPEDIA_HOST.to_string(),
            geocoding_host: GEOCODING_HOST.to_string(),
            weather_host: WEATHER_HOST.to_string(),
            exchange_rate_host: EXCHANGE_RATE_HOST.to_string(),
            countries_host: COUNTRIES_HOST.to_string(),
        }
    }
}

/// Keep at most `max` characters, never splitting a code point
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

pub(crate) fn endpoint(host: &str, path: &str) -> String {
    format!("{}/{}", host.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    struct Echo {
        descriptor: ToolDescriptor,
    }

    #[derive(Deserialize)]
    struct EchoArgs {
        message: String,
    }

    #[async_trait]
    impl Tool for Echo {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn execute(&self, arguments: Value) -> AgentResult<String> {
            let args: EchoArgs = parse_arguments(arguments)?;
            Ok(args.message)
        }
    }

    fn echo() -> Echo {
        Echo {
            descriptor: ToolDescriptor::new("echo", "reply with the input", json!({})),
        }
    }

    #[tokio::test]
    async fn test_call_tool_success() {
        assert_eq!(call_tool(&echo(), json!({"message": "hello"})).await, "hello");
    }

    #[tokio::test]
    async fn test_call_tool_folds_errors_into_text() {
        let text = call_tool(&echo(), json!({"wrong": 1})).await;
        assert!(text.starts_with("Invalid parameters:"));
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("日本語", 2), "日本");
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(endpoint("http://h/", "/v1/search"), "http://h/v1/search");
        assert_eq!(endpoint("http://h", "v1/search"), "http://h/v1/search");
    }
}
