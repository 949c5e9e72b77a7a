use crate::error::ServerResult;
use crate::routes::analysis::CreatedResponse;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use fakedetector::NewFeedback;
use std::sync::Arc;

/// Store user feedback on an analysis
pub async fn submit_feedback(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<NewFeedback>,
) -> ServerResult<impl IntoResponse> {
    let id = state.store.submit_feedback(&request).await?;

    Ok(Json(CreatedResponse {
        id,
        message: "Feedback saved".to_string(),
    }))
}
