use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::constants::*;
use crate::error::{GatewayError, Result};

/// Main configuration container for the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Which backend the database handle binds to
    pub backend: BackendKind,
    /// Hosted Supabase settings (used when `backend` is remote)
    pub remote: RemoteConfig,
    /// Where sessions are persisted between runs
    pub session: SessionConfig,
    /// City search settings
    pub cities: CityConfig,
    /// Logging configuration settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables or use defaults
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            backend: lookup("DATABASE_BACKEND")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            remote: RemoteConfig::from_lookup(&lookup),
            session: SessionConfig::from_lookup(&lookup),
            cities: CityConfig::from_lookup(&lookup),
            logging: LoggingConfig::from_lookup(&lookup),
        }
    }

    /// Config bound to the local stub with in-memory sessions
    pub fn local() -> Self {
        Self::default()
    }

    /// Config bound to a hosted project
    pub fn remote(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            backend: BackendKind::Remote,
            remote: RemoteConfig {
                url: Some(url.into()),
                anon_key: Some(anon_key.into()),
                ..RemoteConfig::default()
            },
            ..Self::default()
        }
    }

    /// Check the settings the selected backend needs
    pub fn validate(&self) -> Result<()> {
        if self.backend == BackendKind::Remote {
            self.remote.require_url()?;
            self.remote.require_anon_key()?;
        }
        if self.session.storage_type == SessionStorageType::File
            && self.session.path.as_os_str().is_empty()
        {
            return Err(GatewayError::config(
                "SESSION_STORAGE_PATH must be set for file session storage",
            ));
        }
        Ok(())
    }
}

/// Backend the database handle is bound to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process stub, no network
    #[default]
    Local,
    /// Hosted Supabase over HTTP
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Remote => "remote",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "stub" => Ok(BackendKind::Local),
            "remote" | "supabase" => Ok(BackendKind::Remote),
            _ => Err(format!("Invalid backend: {}", s)),
        }
    }
}

/// Hosted Supabase configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: Option<String>,
    /// Public anon key sent as `apikey`
    pub anon_key: Option<String>,
    /// Storage key for the persisted session
    pub session_key: String,
    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            session_key: DEFAULT_REMOTE_SESSION_KEY.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl RemoteConfig {
    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Self {
        Self {
            url: lookup("SUPABASE_URL").filter(|v| !v.trim().is_empty()),
            anon_key: lookup("SUPABASE_ANON_KEY").filter(|v| !v.trim().is_empty()),
            session_key: lookup("SUPABASE_SESSION_KEY")
                .unwrap_or_else(|| DEFAULT_REMOTE_SESSION_KEY.to_string()),
            timeout_secs: lookup("HTTP_TIMEOUT_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Project URL without a trailing slash
    pub fn require_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .ok_or_else(|| GatewayError::config("SUPABASE_URL is required for the remote backend"))
    }

    pub fn require_anon_key(&self) -> Result<&str> {
        self.anon_key.as_deref().ok_or_else(|| {
            GatewayError::config("SUPABASE_ANON_KEY is required for the remote backend")
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session storage type enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStorageType {
    /// Process memory, lost on exit
    #[default]
    Memory,
    /// One JSON file per key on disk
    File,
}

impl std::str::FromStr for SessionStorageType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(SessionStorageType::Memory),
            "file" | "disk" => Ok(SessionStorageType::File),
            _ => Err(format!("Invalid session storage type: {}", s)),
        }
    }
}

/// Session persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub storage_type: SessionStorageType,
    /// Directory for file storage
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_type: SessionStorageType::Memory,
            path: PathBuf::from(DEFAULT_SESSION_STORAGE_PATH),
        }
    }
}

impl SessionConfig {
    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Self {
        Self {
            storage_type: lookup("SESSION_STORAGE")
                .unwrap_or_else(|| DEFAULT_SESSION_STORAGE.to_string())
                .parse()
                .unwrap_or_default(),
            path: lookup("SESSION_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_STORAGE_PATH)),
        }
    }
}

/// Where city search results come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitySourceKind {
    /// Built-in city table
    #[default]
    Static,
    /// `cities_lookup` through the database handle
    Database,
}

impl std::str::FromStr for CitySourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" | "builtin" => Ok(CitySourceKind::Static),
            "database" | "db" => Ok(CitySourceKind::Database),
            _ => Err(format!("Invalid city source: {}", s)),
        }
    }
}

/// City search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityConfig {
    pub source: CitySourceKind,
    /// Cache entry lifetime in seconds
    pub cache_ttl_secs: i64,
    /// Maximum results per query
    pub limit: usize,
    /// Distinct queries kept in the cache before the oldest is evicted
    pub cache_max_entries: usize,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            source: CitySourceKind::Static,
            cache_ttl_secs: DEFAULT_CITY_CACHE_TTL_SECS,
            limit: DEFAULT_CITY_SEARCH_LIMIT,
            cache_max_entries: DEFAULT_CITY_CACHE_MAX_ENTRIES,
        }
    }
}

impl CityConfig {
    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Self {
        Self {
            source: lookup("CITY_SOURCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            cache_ttl_secs: lookup("CITY_CACHE_TTL_SECONDS")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v >= 0)
                .unwrap_or(DEFAULT_CITY_CACHE_TTL_SECS)
                .min(MAX_CITY_CACHE_TTL_SECS),
            limit: lookup("CITY_SEARCH_LIMIT")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_CITY_SEARCH_LIMIT)
                .clamp(1, MAX_CITY_SEARCH_LIMIT),
            cache_max_entries: lookup("CITY_CACHE_MAX_ENTRIES")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_CITY_CACHE_MAX_ENTRIES),
        }
    }

    /// Cache TTL; out-of-range values fall back to the default
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.cache_ttl_secs.clamp(0, MAX_CITY_CACHE_TTL_SECS))
            .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_CITY_CACHE_TTL_SECS))
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: &F) -> Self {
        Self {
            level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format: lookup("LOG_FORMAT").unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string()),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}
