use crate::config::ServerConfig;
use crate::error::ServerResult;
use dashmap::DashMap;
use fakedetector::Store;
use std::sync::Arc;
use std::time::Instant;
use subtle::ConstantTimeEq;

/// Tracked clients above which expired windows are swept on the next check
const RATE_LIMIT_SWEEP_THRESHOLD: usize = 1024;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// The single store handle shared by every request
    pub store: Arc<Store>,

    /// Rate limit tracking: client address -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, Instant)>>,
}

impl ServerState {
    /// Open the configured store file and prepare its schema. With
    /// `reset_on_startup` the file is rebuilt from scratch first.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = Store::open(config.store_location())?;
        if config.reset_on_startup {
            tracing::warn!("RESET_DATABASE set, rebuilding store");
            store.reset(config.seed_on_reset).await?;
        } else {
            store.ensure_schema().await?;
        }
        Ok(Self::with_store(config, store))
    }

    /// Wrap an already prepared store.
    pub fn with_store(config: ServerConfig, store: Store) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            rate_limiter: Arc::new(DashMap::new()),
        }
    }

    /// Compare a presented key against the configured secret. An empty
    /// secret or key never matches.
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        if key.is_empty() || self.config.api_key.is_empty() {
            return false;
        }
        key.as_bytes()
            .ct_eq(self.config.api_key.as_bytes())
            .into()
    }

    /// Check rate limit for a client
    pub fn check_rate_limit(&self, client: &str) -> bool {
        let limit = self.config.rate_limit_max;
        if limit == 0 {
            return true;
        }
        let now = Instant::now();
        let window = self.config.rate_limit_window();

        if self.rate_limiter.len() > RATE_LIMIT_SWEEP_THRESHOLD {
            self.evict_expired_windows(now);
        }

        let mut entry = self.rate_limiter.entry(client.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }

    /// Forget clients whose window has run out; returns how many were removed.
    pub fn evict_expired_windows(&self, now: Instant) -> usize {
        let window = self.config.rate_limit_window();
        let before = self.rate_limiter.len();
        self.rate_limiter
            .retain(|_, (_, window_start)| now.duration_since(*window_start) <= window);
        let removed = before.saturating_sub(self.rate_limiter.len());
        if removed > 0 {
            tracing::debug!(removed, "evicted expired rate limit windows");
        }
        removed
    }
}
