//! Display helpers for the wallet dashboard: currency, abbreviated amounts
//! and price-change percentages.

use serde_json::Value;

/// Formats a USD value as `$1,234.56`.
pub fn format_usd(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round();
    let frac = cents % 100.0;
    let whole = (cents - frac) / 100.0;
    format!("{sign}${}.{:02}", group_thousands(whole), frac as u8)
}

const UNITS: [(f64, &str); 5] = [(1.0, ""), (1e3, "k"), (1e6, "m"), (1e9, "b"), (1e12, "t")];

/// Formats a token amount with a magnitude suffix and at most two decimals:
/// `1234.5` → `1.23k`, `2500000` → `2.5m`, `12` → `12`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let magnitude = value.abs();
    let mut unit = UNITS
        .iter()
        .rposition(|(base, _)| magnitude >= *base)
        .unwrap_or(0);
    let mut hundredths = (magnitude / UNITS[unit].0 * 100.0).round();
    // 999.999 rounds to 1000.00, which belongs to the next unit.
    if hundredths >= 100_000.0 && unit + 1 < UNITS.len() {
        unit += 1;
        hundredths = (magnitude / UNITS[unit].0 * 100.0).round();
    }
    let frac = hundredths % 100.0;
    let whole = (hundredths - frac) / 100.0;

    let mut out = String::new();
    if value < 0.0 && hundredths > 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if frac > 0.0 {
        let digits = format!("{:02}", frac as u8);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out.push_str(UNITS[unit].1);
    out
}

/// Groups the integer part of a non-negative whole number with commas.
/// Works on the float directly so amounts past `u64::MAX` keep their digits.
fn group_thousands(whole: f64) -> String {
    let digits = format!("{:.0}", whole.trunc());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Percent change from `past` to `curr`; `None` when either is missing or
/// `past` is zero.
pub fn pct(curr: Option<f64>, past: Option<f64>) -> Option<f64> {
    match (curr, past) {
        (Some(c), Some(p)) if p != 0.0 => Some((c - p) / p * 100.0),
        _ => None,
    }
}

/// The `price_usd` of the historical point `hours` back, if present.
pub fn price_at(history: &[Value], hours: u64) -> Option<f64> {
    history
        .iter()
        .find(|p| p.get("offset_hours").and_then(Value::as_u64) == Some(hours))
        .and_then(|p| p.get("price_usd"))
        .and_then(Value::as_f64)
}

pub fn change_1h(price: Option<f64>, history: &[Value]) -> Option<f64> {
    pct(price, price_at(history, 1))
}

pub fn change_6h(price: Option<f64>, history: &[Value]) -> Option<f64> {
    pct(price, price_at(history, 6))
}

pub fn change_24h(price: Option<f64>, history: &[Value]) -> Option<f64> {
    pct(price, price_at(history, 24))
}

/// `+1.23%`, `-0.50%`, or `—` when there is no value.
pub fn format_signed_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v >= 0.0 => format!("+{v:.2}%"),
        Some(v) => format!("{v:.2}%"),
        None => "—".to_string(),
    }
}
