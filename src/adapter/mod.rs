//! The database handle callers hold: `auth`, `from(table)` and `rpc`.

pub mod builder;

use serde_json::Value;
use std::sync::Arc;

use crate::auth::AuthClient;
use crate::backend::{Backend, HealthReport};
use crate::config::settings::{BackendKind, Config};
use crate::models::response::Envelope;
use crate::query::QueryBuilder;

pub use builder::DatabaseBuilder;

/// Supabase-shaped handle bound to one backend for its whole lifetime
#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn Backend>,
    config: Arc<Config>,
}

impl Database {
    pub fn new(backend: Arc<dyn Backend>, config: Arc<Config>) -> Self {
        Self { backend, config }
    }

    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    pub fn auth(&self) -> Arc<dyn AuthClient> {
        self.backend.auth()
    }

    /// Start a query on `table`
    pub fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(self.backend.clone(), table)
    }

    pub async fn rpc(&self, function: &str, args: Value) -> Envelope<Value> {
        self.backend.rpc(function, args).await
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn health_check(&self) -> HealthReport {
        self.backend.health_check().await
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("backend", &self.backend.kind())
            .finish()
    }
}
