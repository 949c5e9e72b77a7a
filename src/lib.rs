//! Storage layer for image-authenticity analysis results.
//!
//! Records the real/fake predictions produced by an external detection
//! model, the feedback users leave on them, and aggregate statistics, all in
//! a single SQLite file:
//!
//! - [`schema`]: idempotent table/index creation and additive migrations
//! - [`analysis`]: create, paginated list, bulk delete
//! - [`feedback`]: feedback submission
//! - [`statistics`]: count, real/fake breakdown, average confidence
//! - [`Store`]: the shared connection handle with close and reset
//!
//! Every data operation takes a [`Scope`]: `Scope::All` for the global
//! deployment, `Scope::Owner` when records are kept per user.
//!
//! ```rust,no_run
//! use fakedetector::{Page, Scope, Store, StoreLocation};
//!
//! # async fn demo() -> Result<(), fakedetector::StoreError> {
//! let store = Store::open(StoreLocation::file("./database.sqlite"))?;
//! store.ensure_schema().await?;
//!
//! let rows = store.list_analyses(&Scope::All, Page::default()).await?;
//! println!("{} recent analyses", rows.len());
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod feedback;
pub mod model;
pub mod schema;
pub mod statistics;
pub mod store;

pub use analysis::Page;
pub use config::{Scope, ScopeMode, StoreLocation};
pub use error::{StoreError, StoreResult};
pub use model::{AnalysisRow, FAKE_LABEL, NewAnalysis, NewFeedback, REAL_LABEL, Statistics};
pub use store::Store;
