//! Model-facing fetches: one capped request, then a compact summary.
//!
//! Each function issues a single request through [`SimClient`] and reshapes
//! the body into a total count plus a short prefix of normalized fields, so
//! the payload handed to the model stays small. List requests never ask the
//! upstream API for more than [`MAX_LIST_LIMIT`] items.

use crate::client::{BalanceOptions, SimClient};
use serde_json::{json, Map, Value};
use simchat_core::SimchatResult;

/// Upper bound on any `limit` sent upstream, whatever the caller asked for.
pub const MAX_LIST_LIMIT: u32 = 10;

const BALANCES_SHOWN: usize = 10;
const ITEMS_SHOWN: usize = 5;

/// Clamps a requested list size to [`MAX_LIST_LIMIT`].
pub fn cap_limit(requested: u32) -> u32 {
    requested.min(MAX_LIST_LIMIT)
}

pub async fn token_balances(
    client: &SimClient,
    address: &str,
    exclude_spam_tokens: bool,
) -> SimchatResult<Value> {
    let options = BalanceOptions {
        exclude_spam_tokens,
        ..BalanceOptions::default()
    };
    let body = client.balances(address, &options).await?;
    Ok(summarize_balances(address, &body))
}

pub async fn wallet_activity(client: &SimClient, address: &str, limit: u32) -> SimchatResult<Value> {
    let body = client.activity(address, cap_limit(limit)).await?;
    Ok(summarize_activity(address, &body))
}

pub async fn nft_collectibles(
    client: &SimClient,
    address: &str,
    limit: u32,
) -> SimchatResult<Value> {
    let body = client.collectibles(address, cap_limit(limit)).await?;
    Ok(summarize_collectibles(address, &body))
}

/// Token metadata is passed through unchanged.
pub async fn token_info(
    client: &SimClient,
    token_address: &str,
    chain_ids: &str,
) -> SimchatResult<Value> {
    client.token_info(token_address, chain_ids).await
}

pub async fn token_holders(
    client: &SimClient,
    chain_id: u64,
    token_address: &str,
    limit: u32,
) -> SimchatResult<Value> {
    let body = client
        .token_holders(chain_id, token_address, cap_limit(limit))
        .await?;
    Ok(summarize_holders(chain_id, token_address, &body))
}

pub async fn transactions(client: &SimClient, address: &str, limit: u32) -> SimchatResult<Value> {
    let body = client.transactions(address, cap_limit(limit)).await?;
    Ok(summarize_transactions(address, &body))
}

/// The chain catalog is passed through unchanged.
pub async fn supported_chains(client: &SimClient) -> SimchatResult<Value> {
    client.supported_chains().await
}

// ---------------------------------------------------------------------------
// Shaping
// ---------------------------------------------------------------------------

/// The array under `key`, or an empty slice when absent or not an array.
pub fn items<'a>(body: &'a Value, key: &str) -> &'a [Value] {
    body.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn pick(item: &Value, fields: &[&str]) -> Value {
    let picked: Map<String, Value> = fields
        .iter()
        .map(|f| ((*f).to_string(), item.get(*f).cloned().unwrap_or(Value::Null)))
        .collect();
    Value::Object(picked)
}

fn wallet_of(body: &Value, fallback: &str) -> Value {
    body.get("wallet_address")
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| Value::String(fallback.to_string()))
}

fn note_truncation(summary: &mut Value, shown: usize, total: usize, noun: &str) {
    if total > shown {
        summary["note"] = json!(format!("Showing top {shown} of {total} total {noun}"));
    }
}

pub fn summarize_balances(address: &str, body: &Value) -> Value {
    let balances = items(body, "balances");
    let prefix: Vec<Value> = balances
        .iter()
        .take(BALANCES_SHOWN)
        .map(|b| pick(b, &["symbol", "amount", "value_usd", "chain"]))
        .collect();
    let mut summary = json!({
        "wallet_address": wallet_of(body, address),
        "total_balances": balances.len(),
        "balances": prefix,
    });
    note_truncation(&mut summary, BALANCES_SHOWN, balances.len(), "balances");
    summary
}

pub fn summarize_activity(address: &str, body: &Value) -> Value {
    let activity = items(body, "activity");
    let prefix: Vec<Value> = activity
        .iter()
        .take(ITEMS_SHOWN)
        .map(|a| {
            pick(
                a,
                &["type", "block_time", "value_usd", "chain", "transaction_hash"],
            )
        })
        .collect();
    let mut summary = json!({
        "wallet_address": wallet_of(body, address),
        "total_activities": activity.len(),
        "recent_activities": prefix,
    });
    note_truncation(&mut summary, ITEMS_SHOWN, activity.len(), "activities");
    summary
}

pub fn summarize_collectibles(address: &str, body: &Value) -> Value {
    let collectibles = items(body, "collectibles");
    let prefix: Vec<Value> = collectibles
        .iter()
        .take(ITEMS_SHOWN)
        .map(|nft| {
            json!({
                "name": nft.get("name").cloned().unwrap_or(Value::Null),
                "collection": nft.pointer("/collection/name").cloned().unwrap_or(Value::Null),
                "chain": nft.get("chain").cloned().unwrap_or(Value::Null),
                "token_id": nft.get("token_id").cloned().unwrap_or(Value::Null),
            })
        })
        .collect();
    let mut summary = json!({
        "wallet_address": address,
        "total_collectibles": collectibles.len(),
        "collectibles": prefix,
    });
    note_truncation(&mut summary, ITEMS_SHOWN, collectibles.len(), "collectibles");
    summary
}

pub fn summarize_holders(chain_id: u64, token_address: &str, body: &Value) -> Value {
    let holders = items(body, "holders");
    let prefix: Vec<Value> = holders
        .iter()
        .take(ITEMS_SHOWN)
        .map(|h| pick(h, &["address", "balance", "percentage"]))
        .collect();
    let mut summary = json!({
        "token_address": token_address,
        "chain_id": chain_id,
        "total_holders": holders.len(),
        "top_holders": prefix,
    });
    note_truncation(&mut summary, ITEMS_SHOWN, holders.len(), "holders");
    summary
}

pub fn summarize_transactions(address: &str, body: &Value) -> Value {
    let txs = items(body, "transactions");
    let prefix: Vec<Value> = txs
        .iter()
        .take(ITEMS_SHOWN)
        .map(|tx| pick(tx, &["hash", "block_time", "value", "gas_used", "chain"]))
        .collect();
    let mut summary = json!({
        "wallet_address": address,
        "total_transactions": txs.len(),
        "recent_transactions": prefix,
    });
    note_truncation(&mut summary, ITEMS_SHOWN, txs.len(), "transactions");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_limit() {
        assert_eq!(cap_limit(1000), 10);
        assert_eq!(cap_limit(10), 10);
        assert_eq!(cap_limit(3), 3);
        assert_eq!(cap_limit(0), 0);
    }

    #[test]
    fn test_balances_summary_truncates_with_note() {
        let balances: Vec<Value> = (0..12)
            .map(|i| json!({"symbol": format!("T{i}"), "amount": "1", "value_usd": 1.0, "chain": "ethereum", "logo": "x"}))
            .collect();
        let body = json!({"wallet_address": "0xabc", "balances": balances});

        let summary = summarize_balances("0xabc", &body);

        assert_eq!(summary["total_balances"], 12);
        assert_eq!(summary["balances"].as_array().map(Vec::len), Some(10));
        assert_eq!(summary["balances"][0]["symbol"], "T0");
        assert!(summary["balances"][0].get("logo").is_none());
        assert_eq!(summary["note"], "Showing top 10 of 12 total balances");
    }

    #[test]
    fn test_balances_summary_without_truncation_has_no_note() {
        let body = json!({"balances": [{"symbol": "ETH", "amount": "1", "value_usd": 2.0, "chain": "ethereum"}]});
        let summary = summarize_balances("0xdef", &body);
        assert_eq!(summary["wallet_address"], "0xdef");
        assert_eq!(summary["total_balances"], 1);
        assert!(summary.get("note").is_none());
    }

    #[test]
    fn test_missing_collection_defaults_to_empty() {
        let summary = summarize_activity("0xabc", &json!({}));
        assert_eq!(summary["total_activities"], 0);
        assert_eq!(summary["recent_activities"], json!([]));

        let summary = summarize_transactions("0xabc", &json!({"transactions": null}));
        assert_eq!(summary["total_transactions"], 0);
    }

    #[test]
    fn test_collectibles_flatten_collection_name() {
        let body = json!({"collectibles": [
            {"name": "Punk #1", "collection": {"name": "CryptoPunks"}, "chain": "ethereum", "token_id": "1"},
            {"name": "Loose", "chain": "base", "token_id": "7"}
        ]});
        let summary = summarize_collectibles("0xabc", &body);
        assert_eq!(summary["collectibles"][0]["collection"], "CryptoPunks");
        assert_eq!(summary["collectibles"][1]["collection"], Value::Null);
        assert_eq!(summary["total_collectibles"], 2);
    }

    #[test]
    fn test_holders_summary() {
        let holders: Vec<Value> = (0..7)
            .map(|i| json!({"address": format!("0x{i}"), "balance": "100", "percentage": 1.5}))
            .collect();
        let summary = summarize_holders(1, "0xtoken", &json!({"holders": holders}));
        assert_eq!(summary["chain_id"], 1);
        assert_eq!(summary["token_address"], "0xtoken");
        assert_eq!(summary["top_holders"].as_array().map(Vec::len), Some(5));
        assert_eq!(summary["note"], "Showing top 5 of 7 total holders");
    }
}
