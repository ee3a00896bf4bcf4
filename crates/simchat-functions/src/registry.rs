use crate::schema::{ParamSpec, ParamType, ParameterSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use simchat_core::{SimchatError, SimchatResult, ToolCall, ToolResult};
use simchat_sim::{fetch, SimClient};
use tracing::{info, warn};

/// The closed set of functions the model may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    TokenBalances,
    WalletActivity,
    NftCollectibles,
    TokenInfo,
    TokenHolders,
    Transactions,
    SupportedChains,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 7] = [
        Self::TokenBalances,
        Self::WalletActivity,
        Self::NftCollectibles,
        Self::TokenInfo,
        Self::TokenHolders,
        Self::Transactions,
        Self::SupportedChains,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::TokenBalances => "get_token_balances",
            Self::WalletActivity => "get_wallet_activity",
            Self::NftCollectibles => "get_nft_collectibles",
            Self::TokenInfo => "get_token_info",
            Self::TokenHolders => "get_token_holders",
            Self::Transactions => "get_transactions",
            Self::SupportedChains => "get_supported_chains",
        }
    }

    /// Exact-match lookup; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::TokenBalances => "Get realtime token balances for an EVM wallet address across multiple chains. Returns native and ERC20 token balances with USD values.",
            Self::WalletActivity => "Get chronologically ordered transaction activity for an EVM wallet including transfers, contract interactions, and decoded function calls.",
            Self::NftCollectibles => "Get NFT collectibles (ERC721 and ERC1155) owned by an EVM wallet address.",
            Self::TokenInfo => "Get detailed metadata and pricing information for a specific token on EVM chains.",
            Self::TokenHolders => "Get token holders for a specific ERC20 or ERC721 token, ranked by wallet value.",
            Self::Transactions => "Get detailed transaction information for an EVM wallet address.",
            Self::SupportedChains => "Get list of all supported EVM chains and their capabilities.",
        }
    }

    pub fn parameters(self) -> ParameterSchema {
        use ParamType::{Boolean, Number, String};
        let params = match self {
            Self::TokenBalances => vec![
                ParamSpec::required(
                    "address",
                    String,
                    "The wallet address to get balances for (e.g., 0xd8da6bf26964af9d7eed9e03e53415d37aa96045)",
                ),
                ParamSpec::optional(
                    "exclude_spam_tokens",
                    Boolean,
                    "Whether to exclude spam tokens from results",
                    json!(true),
                ),
            ],
            Self::WalletActivity => vec![
                ParamSpec::required("address", String, "The wallet address to get activity for"),
                ParamSpec::optional(
                    "limit",
                    Number,
                    "Maximum number of activities to return (default: 25)",
                    json!(25),
                ),
            ],
            Self::NftCollectibles => vec![
                ParamSpec::required("address", String, "The wallet address to get NFTs for"),
                ParamSpec::optional(
                    "limit",
                    Number,
                    "Maximum number of collectibles to return (default: 50)",
                    json!(50),
                ),
            ],
            Self::TokenInfo => vec![
                ParamSpec::required(
                    "token_address",
                    String,
                    "The token contract address or 'native' for native tokens",
                ),
                ParamSpec::optional(
                    "chain_ids",
                    String,
                    "Chain IDs to search on (e.g., '1,137,8453' or 'all')",
                    json!("all"),
                ),
            ],
            Self::TokenHolders => vec![
                ParamSpec::required(
                    "chain_id",
                    Number,
                    "The chain ID where the token exists (e.g., 1 for Ethereum)",
                ),
                ParamSpec::required("token_address", String, "The token contract address"),
                ParamSpec::optional(
                    "limit",
                    Number,
                    "Maximum number of holders to return (default: 100)",
                    json!(100),
                ),
            ],
            Self::Transactions => vec![
                ParamSpec::required(
                    "address",
                    String,
                    "The wallet address to get transactions for",
                ),
                ParamSpec::optional(
                    "limit",
                    Number,
                    "Maximum number of transactions to return (default: 25)",
                    json!(25),
                ),
            ],
            Self::SupportedChains => vec![],
        };
        ParameterSchema::new(params)
    }
}

/// A catalog entry: a function kind with its declared parameters.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub kind: FunctionKind,
    pub parameters: ParameterSchema,
}

/// What the model sees for one function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters_schema: Value,
}

#[derive(Deserialize)]
struct BalancesArgs {
    address: String,
    exclude_spam_tokens: bool,
}

#[derive(Deserialize)]
struct WalletListArgs {
    address: String,
    #[serde(deserialize_with = "list_limit")]
    limit: u32,
}

#[derive(Deserialize)]
struct TokenInfoArgs {
    token_address: String,
    chain_ids: String,
}

#[derive(Deserialize)]
struct HoldersArgs {
    chain_id: u64,
    token_address: String,
    #[serde(deserialize_with = "list_limit")]
    limit: u32,
}

/// Accepts any non-negative number for `limit`, flooring fractions and
/// capping at [`fetch::MAX_LIST_LIMIT`] before narrowing.
fn list_limit<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let requested = f64::deserialize(deserializer)?;
    if requested.is_nan() || requested < 0.0 {
        return Err(serde::de::Error::custom(format!(
            "limit must be a non-negative number, got {requested}"
        )));
    }
    Ok(requested.floor().min(f64::from(fetch::MAX_LIST_LIMIT)) as u32)
}

fn typed<T: serde::de::DeserializeOwned>(args: Map<String, Value>) -> SimchatResult<T> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| SimchatError::Function(format!("Invalid arguments: {e}")))
}

/// Static catalog of callable data functions, bound to one [`SimClient`].
///
/// Built once at startup and never mutated. [`invoke`](Self::invoke) always
/// produces a JSON string: either the function's result or `{"error": ...}`.
pub struct FunctionRegistry {
    client: SimClient,
    specs: Vec<FunctionSpec>,
    descriptors: Vec<FunctionDescriptor>,
}

impl FunctionRegistry {
    pub fn new(client: SimClient) -> Self {
        let specs: Vec<FunctionSpec> = FunctionKind::ALL
            .into_iter()
            .map(|kind| FunctionSpec {
                kind,
                parameters: kind.parameters(),
            })
            .collect();
        let descriptors = specs
            .iter()
            .map(|s| FunctionDescriptor {
                name: s.kind.name().to_string(),
                description: s.kind.description().to_string(),
                parameters_schema: s.parameters.to_json_schema(),
            })
            .collect();
        info!(count = specs.len(), "Function registry built");
        Self {
            client,
            specs,
            descriptors,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        let kind = FunctionKind::from_name(name)?;
        self.specs.iter().find(|s| s.kind == kind)
    }

    pub fn schema_for(&self, name: &str) -> Option<&ParameterSchema> {
        self.get(name).map(|s| &s.parameters)
    }

    /// The schema catalog sent to the model with every request.
    pub fn descriptors(&self) -> &[FunctionDescriptor] {
        &self.descriptors
    }

    pub fn function_count(&self) -> usize {
        self.specs.len()
    }

    /// Validates `args` and runs the named function.
    pub async fn call(&self, name: &str, args: &Value) -> SimchatResult<Value> {
        let spec = self
            .get(name)
            .ok_or_else(|| SimchatError::Function(format!("Unknown function: {name}")))?;
        let args = spec
            .parameters
            .validate(args)
            .map_err(SimchatError::Function)?;
        self.dispatch(spec.kind, args).await
    }

    /// Like [`call`](Self::call), but always returns a serialized payload.
    pub async fn invoke(&self, name: &str, args: &Value) -> String {
        match self.call(name, args).await {
            Ok(value) => value.to_string(),
            Err(e) => {
                warn!(function = %name, error = %e, "Function call failed");
                e.to_payload()
            }
        }
    }

    /// Runs a model tool call, tagging the payload with the call id.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        info!(function = %call.name, call_id = %call.id, "Calling function");
        match self.call(&call.name, &call.arguments).await {
            Ok(value) => ToolResult::success(&call.id, value.to_string()),
            Err(e) => {
                warn!(function = %call.name, call_id = %call.id, error = %e, "Function call failed");
                ToolResult::error(&call.id, e.to_payload())
            }
        }
    }

    async fn dispatch(&self, kind: FunctionKind, args: Map<String, Value>) -> SimchatResult<Value> {
        let client = &self.client;
        match kind {
            FunctionKind::TokenBalances => {
                let a: BalancesArgs = typed(args)?;
                fetch::token_balances(client, &a.address, a.exclude_spam_tokens).await
            }
            FunctionKind::WalletActivity => {
                let a: WalletListArgs = typed(args)?;
                fetch::wallet_activity(client, &a.address, a.limit).await
            }
            FunctionKind::NftCollectibles => {
                let a: WalletListArgs = typed(args)?;
                fetch::nft_collectibles(client, &a.address, a.limit).await
            }
            FunctionKind::TokenInfo => {
                let a: TokenInfoArgs = typed(args)?;
                fetch::token_info(client, &a.token_address, &a.chain_ids).await
            }
            FunctionKind::TokenHolders => {
                let a: HoldersArgs = typed(args)?;
                fetch::token_holders(client, a.chain_id, &a.token_address, a.limit).await
            }
            FunctionKind::Transactions => {
                let a: WalletListArgs = typed(args)?;
                fetch::transactions(client, &a.address, a.limit).await
            }
            FunctionKind::SupportedChains => fetch::supported_chains(client).await,
        }
    }
}
