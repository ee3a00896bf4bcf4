use crate::llm::{LlmClient, LlmResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use simchat_core::{Message, SimchatResult};
use simchat_functions::FunctionRegistry;
use simchat_session::Session;
use std::sync::Arc;
use tracing::{info, warn};

/// One function invocation made while answering a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallRecord {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// The payload handed back to the model, parsed when it is JSON.
    pub result: Value,
}

/// Outcome of one user turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub reply: String,
    pub function_calls: Vec<FunctionCallRecord>,
}

/// Drives one conversation turn: model, functions, model again.
///
/// At most two model requests per turn. Function calls requested in the
/// first response run sequentially in the order given, each answered by a
/// tool message carrying the same call id. Tool calls requested by the
/// second response are dropped and only its text is kept.
///
/// The tool exchange is written to the session only once the final reply
/// arrives. If the final model call fails, the session keeps just the user
/// message.
pub struct ChatRunner {
    llm: LlmClient,
    functions: Arc<FunctionRegistry>,
}

impl ChatRunner {
    pub fn new(llm: LlmClient, functions: Arc<FunctionRegistry>) -> Self {
        Self { llm, functions }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub async fn run(&self, session: &mut Session, user_input: &str) -> SimchatResult<ChatTurn> {
        session.push(Message::user(user_input));
        let tools = self.functions.descriptors();

        info!(session_id = %session.id, "Requesting model response");
        let first = self.llm.chat(&session.messages, tools).await?;

        let (content, tool_calls) = match first {
            LlmResponse::Done(text) => {
                session.push(Message::assistant(&text));
                return Ok(ChatTurn {
                    reply: text,
                    function_calls: Vec::new(),
                });
            }
            LlmResponse::ToolUse {
                content,
                tool_calls,
            } => (content, tool_calls),
        };

        // Held back until the reply arrives so trimming cannot evict the question mid-turn.
        let mut pending = Vec::with_capacity(tool_calls.len() + 1);
        pending.push(Message::assistant_with_tools(
            content.unwrap_or_default(),
            tool_calls.clone(),
        ));

        let mut records = Vec::with_capacity(tool_calls.len());
        for call in &tool_calls {
            let result = self.functions.execute(call).await;
            pending.push(Message::tool(&call.id, &result.content));
            records.push(FunctionCallRecord {
                id: call.id.clone(),
                name: call.name.clone(),
                arguments: call.arguments.clone(),
                result: serde_json::from_str(&result.content)
                    .unwrap_or(Value::String(result.content)),
            });
        }

        info!(
            session_id = %session.id,
            calls = records.len(),
            "Requesting final model response"
        );
        let context: Vec<Message> = session.messages.iter().chain(&pending).cloned().collect();
        let reply = match self.llm.chat(&context, tools).await? {
            LlmResponse::Done(text) => text,
            LlmResponse::ToolUse {
                content,
                tool_calls,
            } => {
                let names: Vec<&str> = tool_calls.iter().map(|c| c.name.as_str()).collect();
                warn!(
                    session_id = %session.id,
                    dropped = ?names,
                    "Model requested functions in its final response; ignoring"
                );
                content.unwrap_or_default()
            }
        };

        for message in pending {
            session.push(message);
        }
        session.push(Message::assistant(&reply));
        Ok(ChatTurn {
            reply,
            function_calls: records,
        })
    }
}
