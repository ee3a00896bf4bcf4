use super::LlmBackend;
use crate::config::{LlmProvider, ModelConfig};
use crate::llm::LlmResponse;
use async_trait::async_trait;
use serde_json::{json, Value};
use simchat_core::{Message, Role, SimchatError, SimchatResult, ToolCall};
use simchat_functions::FunctionDescriptor;
use tracing::debug;

/// OpenAI-compatible chat completions backend.
///
/// Works with OpenAI, OpenRouter, Groq and any other provider that speaks
/// the chat completions API with `tools`.
pub struct OpenAiBackend {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json");

        if matches!(self.config.provider, LlmProvider::OpenRouter) {
            request.header("X-Title", "simchat")
        } else {
            request
        }
    }

    pub fn build_body(
        &self,
        messages: &[Message],
        tools: &[FunctionDescriptor],
        max_tokens: u32,
    ) -> Value {
        let mut body = json!({
            "model": self.config.model_id,
            "max_tokens": max_tokens,
            "messages": build_messages(messages),
        });
        if let Some(temperature) = self.config.temperature {
            body["temperature"] = json!(temperature);
        }
        if !tools.is_empty() {
            body["tools"] = json!(build_tools(tools));
            body["tool_choice"] = json!("auto");
        }
        body
    }
}

/// Maps session history onto the chat completions message format.
pub fn build_messages(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| match m.role {
            Role::System => json!({"role": "system", "content": m.content}),
            Role::User => json!({"role": "user", "content": m.content}),
            Role::Assistant if m.has_tool_calls() => {
                let calls: Vec<Value> = m
                    .tool_calls
                    .iter()
                    .map(|c| {
                        json!({
                            "id": c.id,
                            "type": "function",
                            "function": {"name": c.name, "arguments": c.arguments_json()},
                        })
                    })
                    .collect();
                let content = if m.content.is_empty() {
                    Value::Null
                } else {
                    json!(m.content)
                };
                json!({"role": "assistant", "content": content, "tool_calls": calls})
            }
            Role::Assistant => json!({"role": "assistant", "content": m.content}),
            Role::Tool => json!({
                "role": "tool",
                "tool_call_id": m.tool_call_id.as_deref().unwrap_or_default(),
                "content": m.content,
            }),
        })
        .collect()
}

fn build_tools(tools: &[FunctionDescriptor]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters_schema,
                }
            })
        })
        .collect()
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn chat(
        &self,
        messages: &[Message],
        tools: &[FunctionDescriptor],
        max_tokens: u32,
    ) -> SimchatResult<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());
        let body = self.build_body(messages, tools, max_tokens);
        debug!(model = %self.config.model_id, messages = messages.len(), "Sending chat completion");

        let resp = self
            .add_provider_headers(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SimchatError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| SimchatError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(SimchatError::Agent(format!(
                "Model API error {status}: {text}"
            )));
        }

        let resp_body: Value = serde_json::from_str(&text)?;
        parse_openai_response(&resp_body)
    }
}

/// Reads the first choice of a chat completions response.
///
/// Tool call arguments that are not valid JSON are kept as a raw string;
/// the registry rejects them later with an error payload.
pub fn parse_openai_response(body: &Value) -> SimchatResult<LlmResponse> {
    let message = body["choices"]
        .get(0)
        .map(|choice| &choice["message"])
        .ok_or_else(|| SimchatError::Agent("Model response contained no choices".into()))?;
    let content = message["content"].as_str().unwrap_or_default().to_string();

    let tool_calls: Vec<ToolCall> = message["tool_calls"]
        .as_array()
        .map(|calls| calls.iter().filter_map(parse_tool_call).collect())
        .unwrap_or_default();

    if tool_calls.is_empty() {
        Ok(LlmResponse::Done(content))
    } else {
        Ok(LlmResponse::ToolUse {
            content: if content.is_empty() {
                None
            } else {
                Some(content)
            },
            tool_calls,
        })
    }
}

fn parse_tool_call(tc: &Value) -> Option<ToolCall> {
    let id = tc["id"].as_str()?.to_string();
    let name = tc["function"]["name"].as_str()?.to_string();
    let raw = tc["function"]["arguments"].as_str().unwrap_or("{}");
    let arguments = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Some(ToolCall {
        id,
        name,
        arguments,
    })
}
