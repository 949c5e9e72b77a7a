//! The process-wide store handle.
//!
//! One SQLite connection is shared by every request and guarded by a mutex,
//! so statements run one after another. rusqlite calls block, so every
//! operation runs on tokio's blocking pool and never on an executor thread.
//! Each statement commits on its own; multi-statement sequences are not
//! wrapped in a transaction. The connection slot is emptied by
//! [`Store::close`] and during [`Store::reset`]; while empty every operation
//! fails with [`StoreError::Closed`] instead of touching a half-rebuilt file.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::Connection;
use tracing::{error, info, warn};

use crate::analysis::{self, Page};
use crate::config::{Scope, StoreLocation};
use crate::error::{StoreError, StoreResult};
use crate::model::{AnalysisRow, NewAnalysis, NewFeedback, Statistics};
use crate::{feedback, schema, statistics};

type Slot = Option<Connection>;

pub struct Store {
    location: StoreLocation,
    conn: Arc<Mutex<Slot>>,
}

impl Store {
    /// Open (creating if needed) the store at `location`. The schema is not
    /// touched; call [`Store::ensure_schema`] before serving.
    pub fn open(location: StoreLocation) -> StoreResult<Self> {
        let conn = open_connection(&location)?;
        info!(location = ?location, "store opened");
        Ok(Self {
            location,
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Run `op` against the connection slot on the blocking pool.
    async fn with_slot<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Slot) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            op(&mut guard)
        })
        .await?
    }

    async fn with_conn<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.with_slot(move |slot| {
            let conn = slot.as_ref().ok_or(StoreError::Closed)?;
            op(conn)
        })
        .await
    }

    pub async fn ensure_schema(&self) -> StoreResult<()> {
        self.with_conn(schema::ensure_schema).await
    }

    pub async fn seed_sample(&self) -> StoreResult<i64> {
        self.with_conn(schema::seed_sample).await
    }

    pub async fn create_analysis(&self, scope: &Scope, new: &NewAnalysis) -> StoreResult<i64> {
        let (scope, new) = (scope.clone(), new.clone());
        self.with_conn(move |conn| analysis::create(conn, &scope, &new))
            .await
    }

    pub async fn list_analyses(&self, scope: &Scope, page: Page) -> StoreResult<Vec<AnalysisRow>> {
        let scope = scope.clone();
        self.with_conn(move |conn| analysis::list(conn, &scope, page))
            .await
    }

    pub async fn delete_analyses(&self, scope: &Scope) -> StoreResult<usize> {
        let scope = scope.clone();
        self.with_conn(move |conn| analysis::delete_all(conn, &scope))
            .await
    }

    pub async fn submit_feedback(&self, new: &NewFeedback) -> StoreResult<i64> {
        let new = new.clone();
        self.with_conn(move |conn| feedback::submit(conn, &new)).await
    }

    pub async fn statistics(&self, scope: &Scope) -> StoreResult<Statistics> {
        let scope = scope.clone();
        self.with_conn(move |conn| statistics::compute(conn, &scope))
            .await
    }

    /// Round-trip a trivial query to confirm the handle is usable.
    pub async fn ping(&self) -> bool {
        let probe = self
            .with_conn(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?))
            .await;
        match probe {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "store ping failed");
                false
            }
        }
    }

    /// Release the connection. Later operations fail with `Closed`.
    pub async fn close(&self) -> StoreResult<()> {
        self.with_slot(|slot| {
            if let Some(conn) = slot.take() {
                conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
                info!("store closed");
            }
            Ok(())
        })
        .await
    }

    /// Drop the whole store and rebuild it from scratch, optionally
    /// reseeding the sample row. The lock is held throughout, so no request
    /// observes the intermediate state; on failure the handle stays closed.
    pub async fn reset(&self, seed: bool) -> StoreResult<()> {
        let location = self.location.clone();
        self.with_slot(move |slot| {
            if let Some(conn) = slot.take() {
                conn.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
            }

            match rebuild(&location, seed) {
                Ok(conn) => {
                    *slot = Some(conn);
                    info!(seed, "store reset");
                    Ok(())
                }
                Err(e) => {
                    error!(error = %e, "store reset failed, handle left closed");
                    Err(e)
                }
            }
        })
        .await
    }
}

fn rebuild(location: &StoreLocation, seed: bool) -> StoreResult<Connection> {
    if let StoreLocation::File(path) = location {
        remove_store_file(path)?;
    }
    let conn = open_connection(location)?;
    schema::ensure_schema(&conn)?;
    if seed {
        schema::seed_sample(&conn)?;
    }
    Ok(conn)
}

fn remove_store_file(path: &Path) -> StoreResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn open_connection(location: &StoreLocation) -> StoreResult<Connection> {
    let conn = match location {
        StoreLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path)?
        }
        StoreLocation::InMemory => Connection::open_in_memory()?,
    };
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn memory_store() -> Store {
        let store = Store::open(StoreLocation::in_memory()).unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = memory_store().await;
        assert!(store.ping().await);

        store.close().await.unwrap();
        assert!(!store.ping().await);
        assert!(matches!(
            store.statistics(&Scope::All).await,
            Err(StoreError::Closed)
        ));
        // closing twice is harmless
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_in_memory_starts_fresh() {
        let store = memory_store().await;
        let new = NewAnalysis {
            prediction: json!("Sahte"),
            ..NewAnalysis::default()
        };
        store.create_analysis(&Scope::All, &new).await.unwrap();
        store.create_analysis(&Scope::All, &new).await.unwrap();

        store.reset(true).await.unwrap();
        let stats = store.statistics(&Scope::All).await.unwrap();
        assert_eq!(stats.total_analyses, 1);
        assert_eq!(stats.real_count, 1);

        store.reset(false).await.unwrap();
        assert_eq!(store.statistics(&Scope::All).await.unwrap(), Statistics::default());
    }

    #[tokio::test]
    async fn test_waiting_on_the_lock_leaves_the_runtime_free() {
        let store = Arc::new(memory_store().await);

        // Single-threaded runtime: if the query waited for the lock on the
        // executor thread this test would deadlock.
        let guard = store.conn.lock().unwrap();
        let pending = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.statistics(&Scope::All).await }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());
        drop(guard);

        let stats = pending.await.unwrap().unwrap();
        assert_eq!(stats, Statistics::default());
    }
}
