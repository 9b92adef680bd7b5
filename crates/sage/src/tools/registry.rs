use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use super::{
    CountryInfoTool, CurrencyConversionTool, EncyclopediaTool, SearchTool, Tool, ToolsConfig,
    WeatherTool,
};
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::ToolDescriptor;
use crate::providers::utils::is_valid_function_name;

/// The fixed set of tools available to the agent
///
/// Registration order is preserved so the model sees the same tool list on every call.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    descriptors: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry of built-in tools, all sharing one HTTP client
    pub fn builtin(config: &ToolsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("sage/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let registry = Self::new()
            .with_tool(SearchTool::web(
                client.clone(),
                &config.tavily_host,
                config.tavily_api_key.clone(),
            ))?
            .with_tool(EncyclopediaTool::new(client.clone(), &config.wikipedia_host))?
            .with_tool(SearchTool::news(
                client.clone(),
                &config.tavily_host,
                config.tavily_api_key.clone(),
            ))?
            .with_tool(WeatherTool::new(
                client.clone(),
                &config.geocoding_host,
                &config.weather_host,
            ))?
            .with_tool(CurrencyConversionTool::new(
                client.clone(),
                &config.exchange_rate_host,
            ))?
            .with_tool(CountryInfoTool::new(client, &config.countries_host))?;
        Ok(registry)
    }

    /// Add a tool, rejecting a name that is already taken or that the model API cannot carry
    pub fn register(&mut self, tool: impl Tool + 'static) -> AgentResult<()> {
        let descriptor = tool.descriptor().clone();
        if !is_valid_function_name(&descriptor.name) {
            return Err(AgentError::Internal(format!(
                "Invalid tool name: {:?}",
                descriptor.name
            )));
        }
        if self.descriptors.iter().any(|d| d.name == descriptor.name) {
            return Err(AgentError::Internal(format!(
                "Duplicate tool name: {}",
                descriptor.name
            )));
        }
        self.descriptors.push(descriptor);
        self.tools.push(Arc::new(tool));
        Ok(())
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> AgentResult<Self> {
        self.register(tool)?;
        Ok(self)
    }

    /// Every tool descriptor, in registration order
    pub fn describe_all(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    pub fn resolve(&self, name: &str) -> AgentResult<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|tool| tool.name() == name)
            .cloned()
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
