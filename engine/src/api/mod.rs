//! HTTP Endpoint Layer
//!
//! JSON API over the session store and the response composer.
//!
//! # Endpoints
//!
//! - GET /start - Create a session, returns its id
//! - POST /chat - Send a prompt, returns the model reply and the session scores
//! - GET /scores?session_id=... - Get the session's stage scores
//! - GET / - Liveness message
//!
//! An unknown session id is a 400 with `{"detail": "Invalid session ID"}`.
//! Model failures are not HTTP errors; they come back inside `response`.

use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sdk::errors::EngineError;
use sdk::types::{Role, StageRequest, StageScoreboard};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use tower_http::trace::TraceLayer;

/// Liveness message returned by `GET /`
pub const LIVENESS_MESSAGE: &str = "✅ Roleplay API is live. Use /start, /chat, /scores.";

/// Response body of `GET /start`
#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
}

/// Request body of `POST /chat`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    pub role: Role,
    pub session_id: String,
    #[serde(default)]
    pub stage: StageRequest,
}

/// Response body of `POST /chat`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
    pub scores: StageScoreboard,
}

/// Query string of `GET /scores`
#[derive(Debug, Deserialize)]
pub struct ScoresQuery {
    pub session_id: String,
}

/// Response body of `GET /scores`
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoresResponse {
    pub session_id: String,
    pub scores: StageScoreboard,
}

/// Error type for handlers
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            EngineError::InvalidSession(session_id) => {
                tracing::info!(session_id = %session_id, "Rejected unknown session");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": "Invalid session ID"})),
                )
                    .into_response()
            }
            other => {
                tracing::error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "Internal server error"})),
                )
                    .into_response()
            }
        }
    }
}

/// Build the router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/start", get(start_handler))
        .route("/chat", post(chat_handler))
        .route("/scores", get(scores_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn serve<F>(state: AppState, addr: &str, shutdown: F) -> Result<(), EngineError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EngineError::Network(format!("Failed to bind to {}: {}", addr, e)))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| EngineError::Network(format!("Failed to get local address: {}", e)))?;

    tracing::info!("Roleplay API listening on http://{}", local_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| EngineError::Network(format!("Server error: {}", e)))?;

    tracing::info!("Roleplay API shut down");
    Ok(())
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({ "message": LIVENESS_MESSAGE }))
}

async fn start_handler(State(state): State<AppState>) -> Json<StartResponse> {
    Json(StartResponse {
        session_id: state.sessions.create_session(),
    })
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let outcome = state
        .composer
        .chat(
            &payload.prompt,
            &payload.stage,
            payload.role,
            &payload.session_id,
        )
        .await?;

    tracing::info!(
        session_id = %payload.session_id,
        role = %payload.role,
        stage = %outcome.stage,
        "Chat turn completed"
    );

    Ok(Json(ChatResponse {
        session_id: payload.session_id,
        response: outcome.response,
        scores: outcome.scores,
    }))
}

async fn scores_handler(
    State(state): State<AppState>,
    Query(query): Query<ScoresQuery>,
) -> Result<Json<ScoresResponse>, ApiError> {
    let scores = state.sessions.scoreboard(&query.session_id)?;
    Ok(Json(ScoresResponse {
        session_id: query.session_id,
        scores,
    }))
}
