use crate::client::{BalanceOptions, SimClient};
use crate::fetch::items;
use crate::format::{
    change_1h, change_24h, change_6h, format_amount, format_signed_percent, format_usd,
};
use serde::Serialize;
use serde_json::{Map, Value};
use simchat_core::SimchatResult;
use tracing::{error, info};

/// How many activity items the dashboard asks for.
pub const DASHBOARD_ACTIVITY_LIMIT: u32 = 25;
const DASHBOARD_COLLECTIBLES_LIMIT: u32 = 50;
const HIDDEN_SYMBOLS: &[&str] = &["RTFKT"];

/// A balance entry with display fields added next to the raw API fields.
#[derive(Debug, Clone, Serialize)]
pub struct TokenView {
    #[serde(flatten)]
    pub raw: Map<String, Value>,
    pub amount_formatted: String,
    pub value_usd_formatted: String,
    pub change_1h: String,
    pub change_6h: String,
    pub change_24h: String,
}

/// Everything the wallet page needs for one address.
#[derive(Debug, Clone, Serialize)]
pub struct WalletView {
    pub wallet_address: String,
    pub current_tab: String,
    pub total_value_usd_formatted: String,
    pub tokens: Vec<TokenView>,
    pub activities: Vec<Value>,
    pub collectibles: Vec<Value>,
    pub error_message: Option<String>,
}

impl WalletView {
    fn empty(address: &str, tab: &str) -> Self {
        Self {
            wallet_address: address.to_string(),
            current_tab: tab.to_string(),
            total_value_usd_formatted: format_usd(0.0),
            tokens: Vec::new(),
            activities: Vec::new(),
            collectibles: Vec::new(),
            error_message: None,
        }
    }
}

/// Loads the wallet dashboard for `address`.
///
/// Balances, activity and collectibles are fetched concurrently. A failed
/// fetch is logged and leaves its list empty; `error_message` is only set
/// when every fetch failed.
pub async fn load_wallet(client: &SimClient, address: &str, tab: &str) -> WalletView {
    let address = address.trim();
    let mut view = WalletView::empty(address, tab);
    if address.is_empty() {
        return view;
    }

    let balance_options = BalanceOptions {
        exclude_spam_tokens: true,
        historical_prices: vec![1, 6, 24],
    };
    let (balances, activity, collectibles) = tokio::join!(
        client.balances(address, &balance_options),
        client.activity(address, DASHBOARD_ACTIVITY_LIMIT),
        client.collectibles(address, DASHBOARD_COLLECTIBLES_LIMIT),
    );

    let all_failed = balances.is_err() && activity.is_err() && collectibles.is_err();

    view.tokens = list_or_empty(balances, "balances", "balances")
        .iter()
        .filter_map(token_view)
        .collect();
    view.activities = list_or_empty(activity, "activity", "activity");
    view.collectibles = list_or_empty(collectibles, "collectibles", "collectibles");

    let total: f64 = view
        .tokens
        .iter()
        .filter_map(|t| t.raw.get("value_usd").and_then(number))
        .sum();
    view.total_value_usd_formatted = format_usd(total);

    if all_failed {
        view.error_message = Some("Failed to fetch wallet data. Please try again.".to_string());
    }

    info!(
        wallet = %address,
        tokens = view.tokens.len(),
        activities = view.activities.len(),
        collectibles = view.collectibles.len(),
        "Wallet dashboard loaded"
    );
    view
}

fn list_or_empty(result: SimchatResult<Value>, key: &str, what: &str) -> Vec<Value> {
    match result {
        Ok(body) => items(&body, key).to_vec(),
        Err(e) => {
            error!(error = %e, "Error fetching wallet {what}");
            Vec::new()
        }
    }
}

/// Accepts JSON numbers and numeric strings; the API uses both.
fn number(value: &Value) -> Option<f64> {
    let parsed: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn token_view(token: &Value) -> Option<TokenView> {
    let raw = token.as_object()?.clone();
    if let Some(symbol) = raw.get("symbol").and_then(Value::as_str) {
        if HIDDEN_SYMBOLS.contains(&symbol) {
            return None;
        }
    }

    let decimals = raw.get("decimals").and_then(number).unwrap_or(0.0);
    let amount = raw
        .get("amount")
        .and_then(number)
        .map(|a| a / 10f64.powf(decimals))
        .unwrap_or(0.0);
    let value_usd = raw.get("value_usd").and_then(number).unwrap_or(0.0);

    let price = raw.get("price_usd").and_then(number);
    let history: &[Value] = raw
        .get("historical_prices")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let changes = [
        change_1h(price, history),
        change_6h(price, history),
        change_24h(price, history),
    ]
    .map(format_signed_percent);
    let [change_1h, change_6h, change_24h] = changes;

    Some(TokenView {
        amount_formatted: format_amount(amount),
        value_usd_formatted: format_usd(value_usd),
        change_1h,
        change_6h,
        change_24h,
        raw,
    })
}
