use serde::Deserialize;
use simchat_agent::ModelConfig;
use simchat_session::SessionConfig;
use simchat_sim::SimConfig;
use std::path::Path;

/// Environment variable holding the model provider key.
pub const MODEL_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable holding the Sim API key.
pub const SIM_KEY_ENV: &str = "SIM_API_KEY";

/// Contents of `simchat.toml`. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct SimchatConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl SimchatConfig {
    /// Reads `path` if it exists; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {e}", path.display())
        })?;
        Self::parse(&raw)
            .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {e}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Fills empty API keys from the environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if self.model.api_key.is_empty() {
            if let Some(key) = non_empty(MODEL_KEY_ENV) {
                self.model.api_key = key;
            }
        }
        if self.sim.api_key.is_empty() {
            if let Some(key) = non_empty(SIM_KEY_ENV) {
                self.sim.api_key = key;
            }
        }
    }

    /// The Sim key is mandatory for anything that talks to the API.
    pub fn require_sim_key(&self) -> anyhow::Result<()> {
        if self.sim.api_key.trim().is_empty() {
            anyhow::bail!("{SIM_KEY_ENV} is not set (or [sim].api_key is empty)");
        }
        Ok(())
    }
}
