pub mod constants;
pub mod settings;

pub use settings::{
    BackendKind, CityConfig, CitySourceKind, Config, LoggingConfig, RemoteConfig, SessionConfig,
    SessionStorageType,
};
