// Re-export core functionality for external use
pub use async_trait::async_trait;

pub mod adapter;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod services;
pub mod storage;
pub mod utils;

// Unified error handling
pub use error::{GatewayError, Result};

pub use adapter::{Database, DatabaseBuilder};
pub use auth::{AuthCallback, AuthClient, LocalAuthClient, RemoteAuthClient, Subscription};
pub use backend::{
    init_backend, Backend, HealthReport, HealthStatus, LocalStubBackend, RemoteBackend,
};
pub use config::settings::{BackendKind, Config};
pub use query::QueryBuilder;
pub use services::{CitySearchService, CitySource, DatabaseCitySource, StaticCitySource};
pub use storage::{
    init_session_storage, FileSessionStorage, MemorySessionStorage, SessionStorage, StorageError,
};

// Model exports
pub use models::{
    AuthChangeEvent, AuthData, AuthResponse, AuthSession, AuthUser, City, Credentials, Envelope,
    ErrorInfo, OAuthData, OAuthOptions, SessionData, SignUpCredentials, UserData,
};

// Version and build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AuthChangeEvent, AuthClient, BackendKind, City, CitySearchService, Config, Credentials,
        Database, DatabaseBuilder, Envelope, ErrorInfo, GatewayError, Result, SignUpCredentials,
        VERSION, NAME,
    };

    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, instrument, warn};
}
