use std::sync::Arc;
use tempfile::TempDir;

use pointbridge::config::constants::LOCAL_SESSION_KEY;
use pointbridge::config::settings::{SessionConfig, SessionStorageType};
use pointbridge::{
    init_session_storage, AuthClient, FileSessionStorage, LocalAuthClient, SessionStorage,
};

mod common;

#[tokio::test]
async fn session_survives_a_new_client_over_the_same_directory() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSessionStorage::new(dir.path()).unwrap());

    let first = LocalAuthClient::new(storage.clone());
    let signed_in = first
        .sign_in_with_password(common::admin_credentials())
        .await
        .data
        .session
        .expect("session");

    let second = LocalAuthClient::new(Arc::new(FileSessionStorage::new(dir.path()).unwrap()));
    let restored = second.get_session().await.data.session.expect("restored session");
    assert_eq!(restored, signed_in);

    second.sign_out().await;
    assert!(storage.get_item(LOCAL_SESSION_KEY).unwrap().is_none());
    let third = LocalAuthClient::new(storage);
    assert!(third.get_session().await.data.session.is_none());
}

#[tokio::test]
async fn corrupt_record_is_discarded() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("local-auth-session.json"), "{\"access_token\":").unwrap();

    let storage = Arc::new(FileSessionStorage::new(dir.path()).unwrap());
    let auth = LocalAuthClient::new(storage);

    assert!(auth.get_session().await.data.session.is_none());
    assert!(!dir.path().join("local-auth-session.json").exists());
}

#[test]
fn factory_builds_file_storage_from_config() {
    let dir = TempDir::new().unwrap();
    let config = SessionConfig {
        storage_type: SessionStorageType::File,
        path: dir.path().join("nested"),
    };

    let storage = init_session_storage(&config).unwrap();
    assert_eq!(storage.storage_type(), "file");
    storage.set_item("k", "v").unwrap();
    assert!(dir.path().join("nested").join("k.json").exists());
}
