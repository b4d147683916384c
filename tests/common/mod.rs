// Common test helpers for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use pointbridge::auth::token::generate_session;
use pointbridge::config::constants::{LOCAL_ADMIN_EMAIL, LOCAL_ADMIN_PASSWORD};
use pointbridge::utils::time::unix_now;
use pointbridge::{
    AuthCallback, AuthChangeEvent, AuthSession, AuthUser, Config, Credentials, Database,
    DatabaseBuilder, MemorySessionStorage,
};

/// Local database handle plus the storage its sessions persist into
pub fn local_db() -> (Database, Arc<MemorySessionStorage>) {
    let storage = Arc::new(MemorySessionStorage::new());
    let db = DatabaseBuilder::new()
        .with_config(Config::local())
        .with_session_storage(storage.clone())
        .build()
        .expect("local database should build");
    (db, storage)
}

pub fn admin_credentials() -> Credentials {
    Credentials::new(LOCAL_ADMIN_EMAIL, LOCAL_ADMIN_PASSWORD)
}

/// Session that expired an hour ago
pub fn expired_session() -> AuthSession {
    generate_session(AuthUser::new(LOCAL_ADMIN_EMAIL, "admin"), unix_now() - 7200)
}

/// Recorded `(event, had_session)` pairs
pub type EventLog = Arc<Mutex<Vec<(AuthChangeEvent, bool)>>>;

pub fn event_recorder() -> (EventLog, AuthCallback) {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let callback: AuthCallback = Box::new(
        move |event: AuthChangeEvent, session: Option<&AuthSession>| {
            sink.lock().unwrap().push((event, session.is_some()));
        },
    );
    (log, callback)
}
