use crate::ledger::Ledger;
use crate::ledger_validation::{self, LedgerError};
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl From<LedgerError> for PersistenceError {
    fn from(value: LedgerError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Raw string storage addressed by key. Typed access goes through [`Repository`].
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> PersistenceResult<()>;
    fn remove(&self, key: &str) -> PersistenceResult<()>;
}

pub fn validate_ledger(ledger: &Ledger) -> PersistenceResult<()> {
    ledger_validation::validate_ledger(ledger).map_err(PersistenceError::from)
}

pub mod file;
pub mod memory;
pub mod repository;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    JsonDirStore, load_homework_from_csv, load_ledger_from_json, save_homework_to_csv,
    save_ledger_to_json,
};
pub use memory::MemoryStore;
pub use repository::{RecordKind, Repository, UserKey, load_active_user, save_active_user};
