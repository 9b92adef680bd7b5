use crate::error::{to_env_var, ConfigError, ENV_PREFIX};
use config::{Config, Environment};
use sage::agent::AgentLimits;
use sage::chat::DEFAULT_DOCUMENT_PREFIX_CHARS;
use sage::providers::configs::{
    OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig, GROQ_HOST, GROQ_MODEL,
    OLLAMA_HOST, OLLAMA_MODEL, OPENAI_HOST, OPENAI_MODEL,
};
use sage::providers::factory::ProviderType;
use sage::tools::{
    ToolsConfig, COUNTRIES_HOST, EXCHANGE_RATE_HOST, GEOCODING_HOST, TAVILY_HOST, WEATHER_HOST,
    WIKIPEDIA_HOST,
};
use serde::Deserialize;
use std::time::Duration;

// Fields of the provider section, used to point a missing value at its variable
const PROVIDER_FIELDS: &[&str] = &["type", "host", "api_key", "model"];

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    Groq {
        #[serde(default = "default_groq_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_groq_model")]
        model: String,
        #[serde(default = "default_groq_temperature")]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    Ollama {
        #[serde(default = "default_ollama_host")]
        host: String,
        #[serde(default = "default_ollama_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderSettings::Groq { .. } => ProviderType::Groq,
            ProviderSettings::OpenAi { .. } => ProviderType::OpenAi,
            ProviderSettings::Ollama { .. } => ProviderType::Ollama,
        }
    }

    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::Groq {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::Groq(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::Ollama {
                host,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::Ollama(OllamaProviderConfig {
                host,
                model,
                temperature,
                max_tokens,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    #[serde(default = "default_model_max_retries")]
    pub model_max_retries: u32,
    #[serde(default = "default_document_prefix_chars")]
    pub document_prefix_chars: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            tool_timeout_secs: default_tool_timeout_secs(),
            model_max_retries: default_model_max_retries(),
            document_prefix_chars: default_document_prefix_chars(),
        }
    }
}

impl AgentSettings {
    pub fn limits(&self) -> AgentLimits {
        AgentLimits {
            max_tool_rounds: self.max_tool_rounds,
            tool_timeout: Duration::from_secs(self.tool_timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolsSettings {
    #[serde(default)]
    pub tavily_api_key: Option<String>,
    #[serde(default = "default_tavily_host")]
    pub tavily_host: String,
    #[serde(default = "default_wikipedia_host")]
    pub wikipedia_host: String,
    #[serde(default = "default_geocoding_host")]
    pub geocoding_host: String,
    #[serde(default = "default_weather_host")]
    pub weather_host: String,
    #[serde(default = "default_exchange_rate_host")]
    pub exchange_rate_host: String,
    #[serde(default = "default_countries_host")]
    pub countries_host: String,
}

impl Default for ToolsSettings {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            tavily_host: default_tavily_host(),
            wikipedia_host: default_wikipedia_host(),
            geocoding_host: default_geocoding_host(),
            weather_host: default_weather_host(),
            exchange_rate_host: default_exchange_rate_host(),
            countries_host: default_countries_host(),
        }
    }
}

impl ToolsSettings {
    pub fn into_config(self) -> ToolsConfig {
        ToolsConfig {
            tavily_api_key: self.tavily_api_key.filter(|key| !key.is_empty()),
            tavily_host: self.tavily_host,
            wikipedia_host: self.wikipedia_host,
            geocoding_host: self.geocoding_host,
            weather_host: self.weather_host,
            exchange_rate_host: self.exchange_rate_host,
            countries_host: self.countries_host,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub tools: ToolsSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("provider.type", ProviderType::Groq.to_string())?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // Handle both NotFound and missing field message variants
                let error_str = err.to_string();
                if let Some(field) = missing_field(&error_str) {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&qualify(field)),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&qualify(field)),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

// Extract `api_key` from "missing field `api_key`"
fn missing_field(message: &str) -> Option<&str> {
    let start = message.find("missing field `")? + "missing field `".len();
    message[start..].split('`').next()
}

// serde reports missing fields without their section
fn qualify(field: &str) -> String {
    if PROVIDER_FIELDS.contains(&field) {
        format!("provider.{}", field)
    } else {
        field.to_string()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_groq_host() -> String {
    GROQ_HOST.to_string()
}

fn default_groq_model() -> String {
    GROQ_MODEL.to_string()
}

fn default_groq_temperature() -> Option<f32> {
    Some(0.0)
}

fn default_openai_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_openai_model() -> String {
    OPENAI_MODEL.to_string()
}

fn default_ollama_host() -> String {
    OLLAMA_HOST.to_string()
}

fn default_ollama_model() -> String {
    OLLAMA_MODEL.to_string()
}

fn default_max_tool_rounds() -> usize {
    AgentLimits::default().max_tool_rounds
}

fn default_tool_timeout_secs() -> u64 {
    AgentLimits::default().tool_timeout.as_secs()
}

fn default_model_max_retries() -> u32 {
    2
}

fn default_document_prefix_chars() -> usize {
    DEFAULT_DOCUMENT_PREFIX_CHARS
}

fn default_tavily_host() -> String {
    TAVILY_HOST.to_string()
}

fn default_wikipedia_host() -> String {
    WIKIPEDIA_HOST.to_string()
}

fn default_geocoding_host() -> String {
    GEOCODING_HOST.to_string()
}

fn default_weather_host() -> String {
    WEATHER_HOST.to_string()
}

fn default_exchange_rate_host() -> String {
    EXCHANGE_RATE_HOST.to_string()
}

fn default_countries_host() -> String {
    COUNTRIES_HOST.to_string()
}
