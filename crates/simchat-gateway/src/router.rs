use simchat_agent::{ChatRunner, FunctionCallRecord};
use simchat_core::SimchatResult;
use simchat_session::SessionStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Body of `POST /chat`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Successful `POST /chat` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub function_calls: Vec<FunctionCallRecord>,
}

/// Routes chat messages to their session and the conversation loop.
pub struct MessageRouter {
    runner: Arc<ChatRunner>,
    sessions: Arc<SessionStore>,
}

impl MessageRouter {
    pub fn new(runner: Arc<ChatRunner>, sessions: Arc<SessionStore>) -> Self {
        Self { runner, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Runs one turn for `message`. An absent or empty `session_id` starts
    /// a new session under a fresh UUID.
    ///
    /// Turns on the same session id are serialized by the session lock.
    pub async fn handle_message(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> SimchatResult<ChatReply> {
        let session_id = match session_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let handle = self.sessions.get_or_create(&session_id).await;
        let mut session = handle.lock().await;
        info!(session_id = %session_id, "Routing message to chat runner");

        match self.runner.run(&mut session, message).await {
            Ok(turn) => Ok(ChatReply {
                message: turn.reply,
                session_id,
                function_calls: turn.function_calls,
            }),
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Chat turn failed");
                Err(e)
            }
        }
    }
}
