pub mod middleware;
pub mod router;
pub mod server;

pub use router::{ChatReply, ChatRequest, MessageRouter};
pub use server::{AppState, GatewayServer};
