pub mod backends;
pub mod config;
pub mod llm;
pub mod runner;

pub use backends::LlmBackend;
pub use config::{LlmProvider, ModelConfig};
pub use llm::{LlmClient, LlmResponse};
pub use runner::{ChatRunner, ChatTurn, FunctionCallRecord};
