//! Data backends a [`Database`](crate::adapter::Database) can be bound to.

pub mod local;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::AuthClient;
use crate::config::settings::{BackendKind, Config, RemoteConfig};
use crate::error::Result;
use crate::models::response::Envelope;
use crate::query::QueryRequest;
use crate::storage::SessionStorage;

pub use local::LocalStubBackend;
pub use remote::RemoteBackend;

/// A place queries and auth calls are sent to
#[async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Auth client sharing this backend's session
    fn auth(&self) -> Arc<dyn AuthClient>;

    /// Run a table query described by the builder
    async fn execute(&self, request: QueryRequest) -> Envelope<Value>;

    /// Call a stored procedure
    async fn rpc(&self, function: &str, args: Value) -> Envelope<Value>;

    async fn health_check(&self) -> HealthReport;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Stub backend, nothing to reach
    Local,
    Connected,
    Unreachable,
}

impl HealthStatus {
    pub fn is_usable(&self) -> bool {
        !matches!(self, HealthStatus::Unreachable)
    }
}

/// Result of [`Backend::health_check`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub backend: BackendKind,
    pub details: Value,
}

/// Backend factory
pub struct BackendFactory;

impl BackendFactory {
    pub fn create_local(storage: Arc<dyn SessionStorage>) -> Arc<dyn Backend> {
        info!("Creating local stub backend");
        Arc::new(LocalStubBackend::new(storage))
    }

    #[instrument(skip(config, storage))]
    pub fn create_remote(
        config: &RemoteConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Arc<dyn Backend>> {
        info!("Creating remote backend for {}", config.require_url()?);
        Ok(Arc::new(RemoteBackend::new(config, storage)?))
    }
}

/// Pick and build the backend named by the configuration
#[instrument(skip(config, storage), fields(backend = %config.backend))]
pub fn init_backend(config: &Config, storage: Arc<dyn SessionStorage>) -> Result<Arc<dyn Backend>> {
    config.validate()?;
    let backend = match config.backend {
        BackendKind::Local => BackendFactory::create_local(storage),
        BackendKind::Remote => BackendFactory::create_remote(&config.remote, storage)?,
    };
    info!("✅ Backend initialized: {}", backend.kind());
    Ok(backend)
}
