use crate::error::ServerResult;
use crate::middleware::RequestScope;
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use fakedetector::{AnalysisRow, NewAnalysis, Page};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Raw pagination parameters; parsed leniently into a [`Page`]
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

/// Response for create endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

/// List response. `total` is the size of the returned page, not the
/// number of stored rows; existing clients read it that way.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub results: Vec<AnalysisRow>,
    pub total: usize,
    pub limit: i64,
    pub offset: i64,
}

/// Store an analysis result
pub async fn create_analysis(
    State(state): State<Arc<ServerState>>,
    RequestScope(scope): RequestScope,
    Json(request): Json<NewAnalysis>,
) -> ServerResult<impl IntoResponse> {
    let id = state.store.create_analysis(&scope, &request).await?;
    tracing::debug!(id, "analysis stored");

    Ok(Json(CreatedResponse {
        id,
        message: "Analysis result saved".to_string(),
    }))
}

/// List analysis results, newest first
pub async fn list_analyses(
    State(state): State<Arc<ServerState>>,
    RequestScope(scope): RequestScope,
    Query(query): Query<ListQuery>,
) -> ServerResult<impl IntoResponse> {
    let page = Page::from_query(query.limit.as_deref(), query.offset.as_deref());
    let results = state.store.list_analyses(&scope, page).await?;

    Ok(Json(ListResponse {
        total: results.len(),
        results,
        limit: page.limit,
        offset: page.offset,
    }))
}

/// Delete every visible analysis result
pub async fn delete_analyses(
    State(state): State<Arc<ServerState>>,
    RequestScope(scope): RequestScope,
) -> ServerResult<impl IntoResponse> {
    let removed = state.store.delete_analyses(&scope).await?;
    tracing::info!(removed, owner = ?scope.owner(), "analysis history cleared");

    Ok(Json(serde_json::json!({
        "message": "All history cleared"
    })))
}
