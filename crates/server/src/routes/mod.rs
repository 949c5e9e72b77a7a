//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `analysis`: analysis results (create, list, delete all)
//! - `feedback`: user feedback on an analysis
//! - `statistics`: aggregate counters
//! - `health`: liveness and administrative reset

pub mod analysis;
pub mod feedback;
pub mod health;
pub mod statistics;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Capability listing
///
/// The root endpoint (GET /); requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "message": "FakeDetector SQL Server API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /api/analysis-results": "Store an analysis result",
            "GET /api/analysis-results": "List analysis history",
            "DELETE /api/analysis-results": "Clear analysis history",
            "POST /api/feedback": "Store user feedback",
            "GET /api/statistics": "Get statistics",
            "GET /api/health": "Server status",
            "POST /api/reset-database": "Rebuild the database"
        }
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
