//! Route definitions and router construction.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use viva_core::{SessionConfig, SessionId, UserId};

use crate::bootstrap::{CorsConfig, GatewayContext};
use crate::error::HttpError;
use crate::gateway;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> =
                origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Payload for registering a prepared session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    /// The only user whose token may join the session.
    user_id: UserId,
    #[serde(flatten)]
    config: SessionConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionReply {
    session_id: SessionId,
}

/// `POST /api/sessions` - register a prepared interview.
///
/// Called by the interview-setup service once questions are generated;
/// candidates never hit this endpoint. The returned id is what the client
/// presents in its `session:join` frame.
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, HttpError> {
    if request.config.questions.is_empty() {
        return Err(HttpError::BadRequest(
            "session needs at least one question".to_string(),
        ));
    }
    if request.config.duration_secs == 0 {
        return Err(HttpError::BadRequest(
            "session duration must be positive".to_string(),
        ));
    }

    let session_id = state.registry.create(request.user_id, request.config);
    Ok((StatusCode::CREATED, Json(CreateSessionReply { session_id })))
}

/// Build all API routes without the `/api` prefix (for nesting).
fn api_routes() -> Router<AppState> {
    Router::new().route("/sessions", post(create_session))
}

/// Create the gateway router.
///
/// `/health` and the `/ws` upgrade sit at the root; the setup-facing REST
/// surface is nested under `/api` behind the CORS layer.
pub fn create_router(ctx: GatewayContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(gateway::session_ws))
        .nest("/api", api_routes().layer(cors))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
