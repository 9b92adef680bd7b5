pub const GROQ_HOST: &str = "https://api.groq.com/openai";
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const OPENAI_MODEL: &str = "gpt-4o";
pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "qwen2.5";

/// Unified enum to wrap the different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Groq(OpenAiProviderConfig),
    OpenAi(OpenAiProviderConfig),
    Ollama(OllamaProviderConfig),
}

/// Configuration for any endpoint speaking the OpenAI chat-completions protocol
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl From<OllamaProviderConfig> for OpenAiProviderConfig {
    // Ollama serves the same protocol without authentication
    fn from(config: OllamaProviderConfig) -> Self {
        OpenAiProviderConfig {
            host: config.host,
            api_key: String::new(),
            model: config.model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}
