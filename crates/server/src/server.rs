//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (auth, identity, rate limiting, logging, CORS, ...)
//! - Graceful shutdown and release of the store handle

use crate::config::ServerConfig;
use crate::middleware::{api_key_auth, log_requests, rate_limit, request_id, require_user_id};
use crate::routes::{analysis, feedback, health, statistics};
use crate::routes::{api_info, not_found};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Public: `/` (capability listing)
/// - Admin: `/api/health`, `/api/reset-database` (API key)
/// - Data: analysis results, feedback, statistics (API key, plus the
///   `user-id` header in per-user mode, checked first)
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new().route("/", get(api_info));

    let admin_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/reset-database", post(health::reset_database))
        .layer(from_fn_with_state(state.clone(), api_key_auth));

    // Layers run outermost-last: the identity check wraps the key check
    let data_routes = Router::new()
        .route(
            "/api/analysis-results",
            post(analysis::create_analysis)
                .get(analysis::list_analyses)
                .delete(analysis::delete_analyses),
        )
        .route("/api/feedback", post(feedback::submit_feedback))
        .route("/api/statistics", get(statistics::get_statistics))
        .layer(from_fn_with_state(state.clone(), api_key_auth))
        .layer(from_fn_with_state(state.clone(), require_user_id));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(data_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
///
/// Opens the configured store, prepares its schema (or rebuilds it when
/// `reset_on_startup` is set), then serves until SIGTERM or Ctrl+C. The
/// store handle is closed after the server stops. Any schema failure
/// aborts startup so traffic is never served from a partial schema.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    if config.uses_default_api_key() {
        tracing::warn!("API_KEY not set, using the built-in placeholder key");
    }

    let state = Arc::new(ServerState::new(config.clone()).await?);

    let app = build_router(state.clone());

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting FakeDetector server on {} (scope: {:?}, store: {})",
        addr,
        config.scope_mode,
        config.database_path.display()
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB",
        config.timeout_secs,
        config.max_body_size_mb
    );
    tracing::info!(
        "Rate limit: {} requests per {}s",
        config.rate_limit_max,
        config.rate_limit_window_secs
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    state.store.close().await?;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
