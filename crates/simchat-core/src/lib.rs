//! Core types and error definitions for simchat.
//!
//! This crate provides the foundational types shared across the simchat crates,
//! including error handling, conversation messages and tool call abstractions.
//!
//! # Main types
//!
//! - [`SimchatError`]: Unified error enum for all simchat subsystems.
//! - [`SimchatResult`]: Convenience alias for `Result<T, SimchatError>`.
//! - [`Role`]: Message role (system, user, assistant, tool).
//! - [`Message`]: A single message within a chat session.
//! - [`ToolCall`]: A model-initiated function invocation request.
//! - [`ToolResult`]: The serialized outcome of executing a tool call.

/// Error enum and result alias.
pub mod error;
/// Conversation message types.
pub mod message;
/// Tool call request/result types.
pub mod tool;

pub use error::{SimchatError, SimchatResult};
pub use message::{Message, Role};
pub use tool::{ToolCall, ToolResult};
