use super::{base::Provider, configs::ProviderConfig, openai::OpenAiProvider, retry::RetryProvider};
use anyhow::Result;
use strum_macros::{Display, EnumIter};

#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderType {
    Groq,
    OpenAi,
    Ollama,
}

impl ProviderConfig {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderConfig::Groq(_) => ProviderType::Groq,
            ProviderConfig::OpenAi(_) => ProviderType::OpenAi,
            ProviderConfig::Ollama(_) => ProviderType::Ollama,
        }
    }
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>> {
    match config {
        ProviderConfig::Groq(groq_config) => Ok(Box::new(OpenAiProvider::new(groq_config)?)),
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Ollama(ollama_config) => {
            Ok(Box::new(OpenAiProvider::new(ollama_config.into())?))
        }
    }
}

/// Build a provider wrapped so that transient failures are retried `max_retries` times
pub fn get_retrying_provider(config: ProviderConfig, max_retries: u32) -> Result<Box<dyn Provider>> {
    let inner = get_provider(config)?;
    Ok(Box::new(RetryProvider::new(inner, max_retries)))
}
