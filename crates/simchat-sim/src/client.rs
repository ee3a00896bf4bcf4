use crate::config::SimConfig;
use reqwest::Url;
use serde_json::Value;
use simchat_core::{SimchatError, SimchatResult};
use tracing::{debug, warn};

/// Header carrying the Sim API credential.
pub const API_KEY_HEADER: &str = "X-Sim-Api-Key";

/// Options for the balances endpoint.
#[derive(Debug, Clone, Default)]
pub struct BalanceOptions {
    pub exclude_spam_tokens: bool,
    /// Offsets in hours, sent as `historical_prices=1,6,24`.
    pub historical_prices: Vec<u32>,
}

/// Thin client over the Sim EVM endpoints.
///
/// Every method issues exactly one GET and returns the parsed JSON body.
/// There are no retries: a failed attempt comes back as an error.
#[derive(Clone)]
pub struct SimClient {
    config: SimConfig,
    http: reqwest::Client,
}

impl SimClient {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub async fn balances(&self, address: &str, options: &BalanceOptions) -> SimchatResult<Value> {
        let mut query = vec![("metadata", "url,logo".to_string())];
        if options.exclude_spam_tokens {
            query.push(("exclude_spam_tokens", "true".to_string()));
        }
        if !options.historical_prices.is_empty() {
            let offsets: Vec<String> = options
                .historical_prices
                .iter()
                .map(ToString::to_string)
                .collect();
            query.push(("historical_prices", offsets.join(",")));
        }
        self.get_json(&["v1", "evm", "balances", address], &query)
            .await
    }

    pub async fn activity(&self, address: &str, limit: u32) -> SimchatResult<Value> {
        self.get_json(
            &["v1", "evm", "activity", address],
            &[("limit", limit.to_string())],
        )
        .await
    }

    pub async fn collectibles(&self, address: &str, limit: u32) -> SimchatResult<Value> {
        self.get_json(
            &["v1", "evm", "collectibles", address],
            &[("limit", limit.to_string())],
        )
        .await
    }

    pub async fn token_info(&self, token_address: &str, chain_ids: &str) -> SimchatResult<Value> {
        self.get_json(
            &["v1", "evm", "token-info", token_address],
            &[("chain_ids", chain_ids.to_string())],
        )
        .await
    }

    pub async fn token_holders(
        &self,
        chain_id: u64,
        token_address: &str,
        limit: u32,
    ) -> SimchatResult<Value> {
        let chain = chain_id.to_string();
        self.get_json(
            &["v1", "evm", "token-holders", &chain, token_address],
            &[("limit", limit.to_string())],
        )
        .await
    }

    pub async fn transactions(&self, address: &str, limit: u32) -> SimchatResult<Value> {
        self.get_json(
            &["v1", "evm", "transactions", address],
            &[("limit", limit.to_string())],
        )
        .await
    }

    pub async fn supported_chains(&self) -> SimchatResult<Value> {
        self.get_json(&["v1", "evm", "supported-chains"], &[]).await
    }

    fn endpoint(&self, segments: &[&str]) -> SimchatResult<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            SimchatError::Config(format!("Invalid Sim base URL '{}': {e}", self.config.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                SimchatError::Config(format!(
                    "Sim base URL '{}' cannot carry a path",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> SimchatResult<Value> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "Sim API request");

        let mut request = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("Content-Type", "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(timeout) = self.config.timeout() {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SimchatError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Sim API request failed");
            let reason = status.canonical_reason().unwrap_or_else(|| status.as_str());
            return Err(SimchatError::Upstream(format!("API request failed: {reason}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SimchatError::Http(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
