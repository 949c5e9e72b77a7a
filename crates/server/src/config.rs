use fakedetector::{ScopeMode, StoreLocation};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder secret used when no API key is configured. Must be
/// overridden in production.
pub const DEFAULT_API_KEY: &str = "fakedetector-secret-key-2025";

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port (`PORT`)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret expected in `Authorization: Bearer <key>` (`API_KEY`)
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// SQLite file backing the store (`DATABASE_PATH`)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Global history or per-user records
    #[serde(default)]
    pub scope_mode: ScopeMode,

    /// Rebuild the store from scratch at startup (`RESET_DATABASE`)
    #[serde(default)]
    pub reset_on_startup: bool,

    /// Insert the sample analysis whenever the store is rebuilt
    #[serde(default = "default_true")]
    pub seed_on_reset: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Requests allowed per client address per window; 0 disables
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    /// Rate limit window in seconds
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            api_key: default_api_key(),
            database_path: default_database_path(),
            scope_mode: ScopeMode::default(),
            reset_on_startup: false,
            seed_on_reset: default_true(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            enable_cors: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.*` file,
    /// `FAKEDETECTOR__*` variables, and finally the plain deployment
    /// variables (`PORT`, `API_KEY`, `RESET_DATABASE`, `DATABASE_PATH`).
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with prefixed environment variables
            .add_source(config::Environment::with_prefix("FAKEDETECTOR").separator("__"))
            .set_override_option("port", env_override("PORT"))?
            .set_override_option("api_key", env_override("API_KEY"))?
            .set_override_option("reset_on_startup", env_override("RESET_DATABASE"))?
            .set_override_option("database_path", env_override("DATABASE_PATH"))?;

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// Whether the placeholder secret is still in use
    pub fn uses_default_api_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }

    pub fn store_location(&self) -> StoreLocation {
        StoreLocation::file(self.database_path.clone())
    }
}

/// A deployment variable, treating set-but-empty as unset so the default
/// applies (`API_KEY=` must never become an empty secret).
fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_key() -> String {
    DEFAULT_API_KEY.to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./database.sqlite")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_rate_limit_max() -> u32 {
    100
}

fn default_rate_limit_window_secs() -> u64 {
    15 * 60
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
