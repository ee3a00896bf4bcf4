use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    OpenRouter,
    /// Groq cloud inference, OpenAI-compatible API.
    Groq,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// Filled from `OPENAI_API_KEY` at startup when left empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Omitted from requests when unset, leaving the provider default.
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model_id() -> String {
    "gpt-4.1".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model_id: default_model_id(),
            api_key: String::new(),
            api_base_url: None,
            temperature: None,
            max_tokens: default_max_tokens(),
        }
    }
}

impl ModelConfig {
    pub fn base_url(&self) -> &str {
        if let Some(url) = &self.api_base_url {
            url.trim_end_matches('/')
        } else {
            match self.provider {
                LlmProvider::OpenAi => "https://api.openai.com",
                LlmProvider::OpenRouter => "https://openrouter.ai/api",
                LlmProvider::Groq => "https://api.groq.com/openai",
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: ModelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.provider, LlmProvider::OpenAi);
        assert_eq!(config.model_id, "gpt-4.1");
        assert_eq!(config.max_tokens, 1000);
        assert!(config.temperature.is_none());
        assert_eq!(config.base_url(), "https://api.openai.com");
    }

    #[test]
    fn test_base_url_override() {
        let config = ModelConfig {
            provider: LlmProvider::Groq,
            api_base_url: Some("http://localhost:8080/".into()),
            ..ModelConfig::default()
        };
        assert_eq!(config.base_url(), "http://localhost:8080");

        let config = ModelConfig {
            provider: LlmProvider::OpenRouter,
            ..ModelConfig::default()
        };
        assert_eq!(config.base_url(), "https://openrouter.ai/api");
    }
}
