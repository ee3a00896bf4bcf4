//! Chat sessions and the in-memory store that owns them.
//!
//! - [`Session`]: ordered message history whose first message is the
//!   system instruction, trimmed to a fixed cap on every append.
//! - [`SessionStore`]: id → session map with an idle sweep.
//! - [`SessionConfig`]: cap, idle TTL, sweep interval, system prompt.

pub mod config;
pub mod session;
pub mod store;

pub use config::{SessionConfig, DEFAULT_SYSTEM_PROMPT};
pub use session::Session;
pub use store::SessionStore;
