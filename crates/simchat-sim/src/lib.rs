//! Client for the Sim blockchain-data API.
//!
//! - [`SimClient`]: one read-only GET per call, `X-Sim-Api-Key` auth.
//! - [`fetch`]: capped, summarized fetches handed to the language model.
//! - [`dashboard`]: the wallet dashboard view (balances, activity, collectibles).
//! - [`format`]: currency, amount and price-change display helpers.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod format;

pub use client::{BalanceOptions, SimClient, API_KEY_HEADER};
pub use config::SimConfig;
pub use dashboard::{load_wallet, TokenView, WalletView};
pub use fetch::MAX_LIST_LIMIT;
