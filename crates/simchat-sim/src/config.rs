use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the Sim API, read from the `[sim]` config table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Sent as the `X-Sim-Api-Key` header. Filled from `SIM_API_KEY` when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. `None` leaves the transport default in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://api.sim.dune.com".to_string()
}

impl SimConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new("")
    }
}
