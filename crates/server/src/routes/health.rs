use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint
///
/// Reports `database: "connected"` only when a probe query succeeds.
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let database = if state.store.ping().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}

/// Drop the store and rebuild it from scratch (API key only)
pub async fn reset_database(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    tracing::warn!("database reset requested");
    state.store.reset(state.config.seed_on_reset).await?;

    Ok(Json(json!({
        "message": "Database reset completed"
    })))
}
