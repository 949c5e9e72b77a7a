use crate::error::ServerError;
use crate::state::ServerState;
use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use fakedetector::Scope;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Header carrying the caller's identity in per-user mode
pub const USER_ID_HEADER: &str = "user-id";

/// Identity validated by [`require_user_id`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

/// API Key authentication middleware
pub async fn api_key_auth(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    // Handle "Bearer <token>" format
    let api_key = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    match api_key {
        Some(key) if state.is_valid_api_key(&key) => Ok(next.run(request).await),
        Some(_) => Err(ServerError::Authentication("Invalid API key".to_string())),
        None => Err(ServerError::Authentication(
            "API key required. Provide it in the 'Authorization: Bearer <key>' header"
                .to_string(),
        )),
    }
}

/// Per-user identity middleware. Layered outside [`api_key_auth`] on data
/// routes, so the identity check runs first. A no-op in global mode.
pub async fn require_user_id(
    State(state): State<Arc<ServerState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if !state.config.scope_mode.requires_identity() {
        return Ok(next.run(request).await);
    }

    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServerError::BadRequest("'user-id' header is required".to_string()))?;

    request.extensions_mut().insert(UserId(user_id));
    Ok(next.run(request).await)
}

/// The visibility a handler applies: the validated owner, or everything.
#[derive(Debug, Clone)]
pub struct RequestScope(pub Scope);

impl<S> FromRequestParts<S> for RequestScope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let scope = match parts.extensions.get::<UserId>() {
            Some(UserId(id)) => Scope::Owner(id.clone()),
            None => Scope::All,
        };
        Ok(RequestScope(scope))
    }
}

/// Per-client rate limiting, keyed by peer address
pub async fn rate_limit(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !state.check_rate_limit(&client) {
        tracing::warn!(client = %client, "rate limit exceeded");
        return Err(ServerError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    // Generate or extract request ID
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // Add to request extensions for handlers to access
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = request_id.parse() {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Request ID stored in request extensions
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    tracing::info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request started"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}
