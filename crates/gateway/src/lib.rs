//! HTTP API for TaskBot.
//!
//! Routes:
//!
//! - `GET  /health`: liveness, always 200
//! - `GET  /`      : plain-text welcome
//! - `POST /chat`  : send a message, get the assistant's reply
//!
//! Built on Axum.

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use taskbot_agent::{ChatError, ChatHandler};
use taskbot_memory::ConversationStore;

/// Welcome text served at `/`.
pub const WELCOME_TEXT: &str = "Bem-vindo ao Task Manager ChatBot! 🚀";

/// Reply sent alongside any 500 response.
pub const APOLOGY: &str = "Desculpe, ocorreu um erro. Tente novamente.";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub handler: Arc<ChatHandler>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(home_handler))
        .route("/chat", post(chat_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the served router: routes plus CORS and a request body limit.
pub fn build_full_router(state: SharedState, body_limit: usize) -> Router {
    build_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Builds the provider (degraded if no credential), the conversation store,
/// and the chat handler once, then serves until Ctrl-C.
pub async fn start(config: taskbot_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = taskbot_providers::build_from_config(&config);
    let store = Arc::new(ConversationStore::new(
        config.conversation.max_turns,
        config.conversation.max_users,
    ));
    let handler = Arc::new(ChatHandler::from_config(&config, provider, store.clone()));

    let sweeper = (config.conversation.sweep_interval_secs > 0).then(|| {
        spawn_idle_sweeper(
            store,
            Duration::from_secs(config.conversation.sweep_interval_secs),
            config.conversation.idle_ttl(),
        )
    });

    let app = build_full_router(
        Arc::new(GatewayState { handler }),
        config.gateway.body_limit_bytes,
    );

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("Gateway stopped");

    Ok(())
}

/// Periodically drop conversations idle for longer than `ttl`.
pub fn spawn_idle_sweeper(
    store: Arc<ConversationStore>,
    every: Duration,
    ttl: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick fires immediately; nothing can be idle yet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.purge_idle(ttl);
            if removed > 0 {
                info!(
                    removed,
                    remaining = store.len(),
                    "Idle conversations purged"
                );
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// --- Handlers ---

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    timestamp: DateTime<Utc>,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".into(),
        timestamp: Utc::now(),
    })
}

async fn home_handler() -> &'static str {
    WELCOME_TEXT
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default, rename = "userId", deserialize_with = "user_id_from_json")]
    user_id: Option<String>,
    #[serde(default)]
    message: String,
}

/// Accept any JSON scalar as a user id; `null` means "not given".
fn user_id_from_json<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(id)) => Some(id),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Serialize, Deserialize)]
struct ChatResponse {
    success: bool,
    reply: String,
    timestamp: DateTime<Utc>,
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reply: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(status: StatusCode, message: String) -> ApiError {
    error!(status = status.as_u16(), error = %message, "Chat request failed");
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message,
            reply: Some(APOLOGY.into()),
        }),
    )
}

async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        internal_error(status, rejection.body_text())
    })?;

    match state
        .handler
        .handle(payload.user_id.as_deref(), &payload.message)
        .await
    {
        Ok(chat) => Ok(Json(ChatResponse {
            success: true,
            reply: chat.reply,
            timestamp: chat.timestamp,
            user_id: chat.user_id,
        })),
        Err(ChatError::EmptyMessage) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                success: false,
                error: ChatError::EmptyMessage.to_string(),
                reply: None,
            }),
        )),
        Err(ChatError::Internal(message)) => {
            Err(internal_error(StatusCode::INTERNAL_SERVER_ERROR, message))
        }
    }
}
