use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{AuthClient, LocalAuthClient};
use crate::backend::{Backend, HealthReport, HealthStatus};
use crate::config::settings::BackendKind;
use crate::models::response::{Envelope, ErrorInfo};
use crate::query::{QueryOperation, QueryRequest, Returning};
use crate::storage::SessionStorage;

/// Network-free backend for local development.
///
/// Data queries are inert: `maybe_single` reads resolve to `null`, every
/// other query and all RPCs resolve to an "unsupported" error.
pub struct LocalStubBackend {
    auth: Arc<LocalAuthClient>,
}

impl LocalStubBackend {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            auth: Arc::new(LocalAuthClient::new(storage)),
        }
    }
}

fn unsupported(message: String) -> Envelope<Value> {
    Envelope::failure(ErrorInfo::new(message).with_code("not_supported"))
}

#[async_trait]
impl Backend for LocalStubBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn auth(&self) -> Arc<dyn AuthClient> {
        self.auth.clone()
    }

    async fn execute(&self, request: QueryRequest) -> Envelope<Value> {
        debug!(
            "Local stub {} on {} ({:?})",
            request.operation.name(),
            request.table,
            request.returning
        );
        if request.operation == QueryOperation::Select
            && request.returning == Returning::MaybeSingle
        {
            return Envelope::ok(Value::Null);
        }
        unsupported(format!(
            "Local Supabase data operations are not supported in browser for table: {}",
            request.table
        ))
    }

    async fn rpc(&self, function: &str, _args: Value) -> Envelope<Value> {
        debug!("Local stub rpc {}", function);
        unsupported(format!(
            "Local Supabase RPC is not supported in browser for function: {}",
            function
        ))
    }

    async fn health_check(&self) -> HealthReport {
        HealthReport {
            status: HealthStatus::Local,
            backend: BackendKind::Local,
            details: json!({
                "auth": self.auth.client_type(),
                "signed_in": self.auth.session().current().is_some(),
            }),
        }
    }
}
