use thiserror::Error;

/// A convenience `Result` alias using [`SimchatError`].
pub type SimchatResult<T> = Result<T, SimchatError>;

/// Top-level error type for simchat.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Error, Debug)]
pub enum SimchatError {
    /// An error originating from the conversation loop or the model client.
    #[error("Agent error: {0}")]
    Agent(String),

    /// A transport-level failure on an outbound HTTP request.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The upstream API answered with a non-success status.
    #[error("{0}")]
    Upstream(String),

    /// An error related to session lookup or bookkeeping.
    #[error("Session error: {0}")]
    Session(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error raised while validating or dispatching a registry function.
    #[error("Function error: {0}")]
    Function(String),

    /// An error from the HTTP gateway layer.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimchatError {
    /// Renders the error as the `{"error": "..."}` payload handed back to the model.
    ///
    /// Function and upstream messages are already phrased for the model and
    /// go out without the subsystem prefix.
    pub fn to_payload(&self) -> String {
        let message = match self {
            Self::Function(msg) | Self::Upstream(msg) => msg.clone(),
            other => other.to_string(),
        };
        serde_json::json!({ "error": message }).to_string()
    }
}
