use crate::configuration::Settings;
use sage::agent::Agent;
use sage::chat::ChatHandler;
use sage::providers::factory;
use sage::store::ConversationStore;
use sage::tools::ToolRegistry;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatHandler>,
}

impl AppState {
    pub fn new(chat: ChatHandler) -> Self {
        Self {
            chat: Arc::new(chat),
        }
    }

    /// Wire the provider, tools, store and handler described by the settings
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let provider_type = settings.provider.provider_type();
        let provider = factory::get_retrying_provider(
            settings.provider.into_config(),
            settings.agent.model_max_retries,
        )?;

        let tools = settings.tools.into_config();
        if tools.tavily_api_key.is_none() {
            tracing::warn!("no Tavily API key configured, web and news search will report failures");
        }
        let registry = ToolRegistry::builtin(&tools)?;
        tracing::info!(provider = %provider_type, tools = ?registry.names(), "agent configured");

        let agent = Agent::new(provider, registry)?.with_limits(settings.agent.limits());
        let chat = ChatHandler::new(agent, ConversationStore::init())
            .with_document_prefix_chars(settings.agent.document_prefix_chars);
        Ok(Self::new(chat))
    }
}
