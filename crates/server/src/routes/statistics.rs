use crate::error::ServerResult;
use crate::middleware::RequestScope;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Count, real/fake breakdown, and average confidence
pub async fn get_statistics(
    State(state): State<Arc<ServerState>>,
    RequestScope(scope): RequestScope,
) -> ServerResult<impl IntoResponse> {
    let stats = state.store.statistics(&scope).await?;
    Ok(Json(stats))
}
