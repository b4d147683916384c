// Centralized configuration constants

// Local stub backend
pub const LOCAL_SESSION_KEY: &str = "local-auth-session";
pub const LOCAL_ADMIN_EMAIL: &str = "admin@rac-rewards.com";
pub const LOCAL_ADMIN_PASSWORD: &str = "admin123!";
pub const LOCAL_OAUTH_EMAIL: &str = "google.user@example.com";
/// One hour
pub const LOCAL_SESSION_TTL_SECS: i64 = 3600;

// Remote (hosted Supabase) backend
pub const DEFAULT_REMOTE_SESSION_KEY: &str = "pointbridge-auth-token";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const REST_PATH: &str = "/rest/v1";
pub const AUTH_PATH: &str = "/auth/v1";

// Session storage
pub const DEFAULT_SESSION_STORAGE: &str = "memory";
pub const DEFAULT_SESSION_STORAGE_PATH: &str = ".pointbridge/session";

// City search
/// 5 minutes
pub const DEFAULT_CITY_CACHE_TTL_SECS: i64 = 300;
/// One week
pub const MAX_CITY_CACHE_TTL_SECS: i64 = 7 * 24 * 3600;
pub const DEFAULT_CITY_CACHE_MAX_ENTRIES: usize = 500;
pub const DEFAULT_CITY_SEARCH_LIMIT: usize = 10;
pub const MAX_CITY_SEARCH_LIMIT: usize = 50;
pub const MIN_CITY_QUERY_LEN: usize = 2;
pub const CITY_CACHE_PREFIX: &str = "cities:";
pub const CITY_LOOKUP_TABLE: &str = "cities_lookup";

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "text";
