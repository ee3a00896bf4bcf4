use crate::middleware::request_log_middleware;
use crate::router::{ChatRequest, MessageRouter};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    middleware as axum_mw,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use simchat_agent::ChatRunner;
use simchat_session::SessionStore;
use simchat_sim::{load_wallet, SimClient};
use std::sync::Arc;
use tracing::warn;

/// Shared application state.
pub struct AppState {
    pub router: Arc<MessageRouter>,
    pub sim: SimClient,
}

/// The HTTP front end.
pub struct GatewayServer;

impl GatewayServer {
    pub fn build(runner: Arc<ChatRunner>, sessions: Arc<SessionStore>, sim: SimClient) -> Router {
        let state = Arc::new(AppState {
            router: Arc::new(MessageRouter::new(runner, sessions)),
            sim,
        });

        Router::new()
            .route("/chat", post(chat_handler))
            .route("/wallet", get(wallet_handler))
            .route("/health", get(health_handler))
            .layer(axum_mw::from_fn(request_log_middleware))
            .with_state(state)
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "simchat"}))
}

fn message_required() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "Message is required"})),
    )
        .into_response()
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected chat request body");
            return message_required();
        }
    };
    let message = match request.message.as_deref() {
        Some(m) if !m.is_empty() => m,
        _ => return message_required(),
    };

    match state
        .router
        .handle_message(message, request.session_id.as_deref())
        .await
    {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "An error occurred while processing your request",
                "details": e.to_string(),
            })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct WalletQuery {
    #[serde(default, rename = "walletAddress")]
    wallet_address: String,
    #[serde(default = "default_tab")]
    tab: String,
}

fn default_tab() -> String {
    "tokens".to_string()
}

async fn wallet_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WalletQuery>,
) -> impl IntoResponse {
    Json(load_wallet(&state.sim, &query.wallet_address, &query.tab).await)
}
