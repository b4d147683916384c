//! Key/value persistence for auth sessions plus the in-process TTL cache.

pub mod cache;
pub mod file;
pub mod memory;

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::settings::{SessionConfig, SessionStorageType};
use crate::error::{GatewayError, Result as AppResult};

pub use cache::{CacheEntryStats, CacheStats, MemoryCache};
pub use file::FileSessionStorage;
pub use memory::MemorySessionStorage;

/// Storage Result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Error types for session storage operations
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

impl StorageError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            StorageError::Io(_) => "io",
            StorageError::Serialization(_) => "serialization",
            StorageError::InvalidKey(_) => "validation",
            StorageError::Poisoned(_) => "lock",
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        GatewayError::Storage(err.to_string())
    }
}

/// Synchronous string key/value store holding persisted sessions.
///
/// Implementations are best effort: callers log failures and keep going with
/// in-memory state.
pub trait SessionStorage: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Short name for logs
    fn storage_type(&self) -> &'static str;
}

/// Session storage factory
pub struct StorageFactory;

impl StorageFactory {
    pub fn create_memory_storage() -> Arc<dyn SessionStorage> {
        info!("Creating memory session storage");
        Arc::new(MemorySessionStorage::new())
    }

    #[instrument(skip(config))]
    pub fn create_file_storage(config: &SessionConfig) -> AppResult<Arc<dyn SessionStorage>> {
        info!("Creating file session storage at {}", config.path.display());
        let storage = FileSessionStorage::new(&config.path)?;
        Ok(Arc::new(storage))
    }
}

/// Initialize session storage from configuration
#[instrument(skip(config))]
pub fn init_session_storage(config: &SessionConfig) -> AppResult<Arc<dyn SessionStorage>> {
    let storage = match config.storage_type {
        SessionStorageType::Memory => StorageFactory::create_memory_storage(),
        SessionStorageType::File => StorageFactory::create_file_storage(config)?,
    };

    info!("✅ Session storage initialized: {}", storage.storage_type());
    Ok(storage)
}
