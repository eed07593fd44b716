use crate::persistence::{JsonDirStore, KeyValueStore, MemoryStore, PersistenceError, UserKey};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_DATA_DIR: &str = "planner-data";
pub const SQLITE_FILE_NAME: &str = "planner.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown store backend '{0}' (expected memory, json, or sqlite)")]
    UnknownStore(String),

    #[error("invalid PLANNER_HTTP_ADDR '{value}': {source}")]
    InvalidAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("sqlite support was not compiled in; rebuild with the `sqlite` feature")]
    SqliteUnavailable,

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Json,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "json" => Ok(StoreBackend::Json),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub store: StoreBackend,
    pub data_dir: PathBuf,
    /// Login identifier to open on startup; `None` starts a guest session.
    pub user: Option<String>,
    pub http_addr: SocketAddr,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::Json,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            user: None,
            http_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(store) = lookup("PLANNER_STORE") {
            config.store = store.parse()?;
        }
        if let Some(dir) = lookup("PLANNER_DATA_DIR").filter(|dir| !dir.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        config.user = lookup("PLANNER_USER").filter(|user| !user.trim().is_empty());
        if let Some(addr) = lookup("PLANNER_HTTP_ADDR") {
            config.http_addr = addr
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidAddr { value: addr.clone(), source })?;
        }
        Ok(config)
    }

    pub fn user_key(&self) -> UserKey {
        UserKey::from_login(self.user.as_deref())
    }

    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        match self.store {
            StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            StoreBackend::Json => Ok(Arc::new(JsonDirStore::new(&self.data_dir)?)),
            StoreBackend::Sqlite => self.open_sqlite(),
        }
    }

    #[cfg(feature = "sqlite")]
    fn open_sqlite(&self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        std::fs::create_dir_all(&self.data_dir).map_err(PersistenceError::from)?;
        let store = crate::persistence::sqlite::SqliteStore::new(self.data_dir.join(SQLITE_FILE_NAME))?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "sqlite"))]
    fn open_sqlite(&self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        Err(ConfigError::SqliteUnavailable)
    }
}
