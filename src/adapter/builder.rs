use std::sync::Arc;
use tracing::{info, instrument};

use crate::adapter::Database;
use crate::backend::{init_backend, Backend};
use crate::config::settings::Config;
use crate::error::Result;
use crate::storage::{init_session_storage, MemorySessionStorage, SessionStorage};

/// Builder wiring configuration, session storage and backend into a [`Database`]
#[derive(Default)]
pub struct DatabaseBuilder {
    config: Option<Config>,
    backend: Option<Arc<dyn Backend>>,
    session_storage: Option<Arc<dyn SessionStorage>>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an already constructed backend instead of the configured one
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use external session storage (tests, shared stores)
    pub fn with_session_storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.session_storage = Some(storage);
        self
    }

    #[instrument(skip(self))]
    pub fn build(self) -> Result<Database> {
        info!("🔧 Building database handle");

        let config = self.config.unwrap_or_else(|| {
            info!("📋 Loading configuration from environment");
            Config::load()
        });

        let backend = match self.backend {
            Some(backend) => {
                info!("Using provided backend instance");
                backend
            }
            None => {
                let storage = match self.session_storage {
                    Some(storage) => storage,
                    None => init_session_storage(&config.session)?,
                };
                init_backend(&config, storage)?
            }
        };

        info!("✅ Database handle bound to {} backend", backend.kind());
        Ok(Database::new(backend, Arc::new(config)))
    }

    /// Local stub with in-memory sessions
    pub fn build_local() -> Result<Database> {
        Self::new()
            .with_config(Config::local())
            .with_session_storage(Arc::new(MemorySessionStorage::new()))
            .build()
    }

    /// Whatever the environment selects
    pub fn build_from_env() -> Result<Database> {
        Self::new().with_config(Config::load()).build()
    }
}
