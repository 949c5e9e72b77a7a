//! FakeDetector Server - HTTP REST API for image-authenticity results
//!
//! Records the real/fake predictions of an external detection model, the
//! feedback users leave on them, and aggregate statistics. Every route
//! except `/` requires `Authorization: Bearer <API_KEY>`; in per-user mode
//! the data routes additionally require a `user-id` header and only ever
//! see that user's rows.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - Capability listing (public)
//! - `POST /api/analysis-results` - Store an analysis result
//! - `GET /api/analysis-results?limit=&offset=` - History, newest first
//! - `DELETE /api/analysis-results` - Clear history
//! - `POST /api/feedback` - Store feedback on an analysis
//! - `GET /api/statistics` - Count, real/fake breakdown, average confidence
//! - `GET /api/health` - Liveness and store connectivity
//! - `POST /api/reset-database` - Drop and rebuild the store

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
