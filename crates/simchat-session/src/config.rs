use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The system instruction every new session starts with.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that can answer questions about blockchain data using Dune's Sim APIs. You have access to various functions that can fetch real-time blockchain data including:

- Token balances for wallets across 60+ EVM chains
- Transaction activity and history
- NFT collections and collectibles
- Token metadata and pricing information
- Token holder distributions
- Supported blockchain networks

When users ask about blockchain data, wallet information, token details, or transaction history, use the appropriate functions to fetch real-time data. Always provide clear, helpful explanations of the data you retrieve.

For wallet addresses, you can analyze balances, activity, NFTs, and transactions. For tokens, you can get metadata, pricing, and holder information. Always format responses in a user-friendly way and explain what the data means.

Keep your responses concise and focused. When presenting large datasets, summarize the key findings rather than listing every detail.";

/// Session store limits, read from the `[session]` config table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// History cap per session, system message included.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    /// Sessions idle for longer than this are removed by the sweep.
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
    /// How often the sweep runs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_max_messages() -> usize {
    20
}

fn default_idle_ttl_secs() -> u64 {
    60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    10 * 60
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl SessionConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            idle_ttl_secs: default_idle_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}
