pub mod openai;

use crate::llm::LlmResponse;
use async_trait::async_trait;
use simchat_core::{Message, SimchatResult};
use simchat_functions::FunctionDescriptor;

/// Trait for language model provider backends.
///
/// `messages` is the full session history, system instruction first.
/// Implement this to plug in a different provider or a scripted test model.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[FunctionDescriptor],
        max_tokens: u32,
    ) -> SimchatResult<LlmResponse>;
}
