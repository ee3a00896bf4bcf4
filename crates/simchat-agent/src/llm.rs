use crate::backends::openai::OpenAiBackend;
use crate::backends::LlmBackend;
use crate::config::ModelConfig;
use simchat_core::{Message, SimchatResult, ToolCall};
use simchat_functions::FunctionDescriptor;

/// Response from the model: final text, or a request to call functions.
#[derive(Debug)]
pub enum LlmResponse {
    Done(String),
    ToolUse {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
}

/// Model client that dispatches to the configured provider backend.
pub struct LlmClient {
    backend: Box<dyn LlmBackend>,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(config: ModelConfig) -> Self {
        let max_tokens = config.max_tokens;
        Self {
            backend: Box::new(OpenAiBackend::new(config)),
            max_tokens,
        }
    }

    /// Create from a pre-built backend (custom providers, scripted tests).
    pub fn from_backend(backend: Box<dyn LlmBackend>, max_tokens: u32) -> Self {
        Self {
            backend,
            max_tokens,
        }
    }

    pub async fn chat(
        &self,
        messages: &[Message],
        tools: &[FunctionDescriptor],
    ) -> SimchatResult<LlmResponse> {
        self.backend.chat(messages, tools, self.max_tokens).await
    }
}
