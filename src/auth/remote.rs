use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::session::SessionHolder;
use crate::auth::{AuthClient, AuthError, Result};
use crate::config::constants::AUTH_PATH;
use crate::config::settings::RemoteConfig;
use crate::models::auth::{
    AuthData, AuthResponse, AuthSession, AuthUser, Credentials, OAuthData, OAuthOptions,
    SessionData, SignUpCredentials, UserData,
};
use crate::models::response::Envelope;
use crate::storage::SessionStorage;
use crate::utils::http::error_info_from_response;
use crate::utils::time::unix_now;

/// GoTrue client for a hosted Supabase project
pub struct RemoteAuthClient {
    http: Client,
    auth_url: String,
    anon_key: String,
    session: SessionHolder,
}

impl RemoteAuthClient {
    pub fn new(
        config: &RemoteConfig,
        http: Client,
        storage: Arc<dyn SessionStorage>,
    ) -> crate::error::Result<Self> {
        let base = config.require_url()?;
        Ok(Self {
            http,
            auth_url: format!("{}{}", base, AUTH_PATH),
            anon_key: config.require_anon_key()?.to_string(),
            session: SessionHolder::new(storage, config.session_key.clone()),
        })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .session
            .access_token()
            .unwrap_or_else(|| self.anon_key.clone());
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let response = self.request(builder).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::Service(error_info_from_response(status, &body)));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn password_grant(&self, credentials: &Credentials) -> Result<AuthData> {
        let url = format!("{}/token?grant_type=password", self.auth_url);
        let body = json!({ "email": credentials.email, "password": credentials.password });
        let payload = self.send(self.http.post(url).json(&body)).await?;
        parse_auth_payload(payload, unix_now())
    }

    async fn register(&self, credentials: &SignUpCredentials) -> Result<AuthData> {
        let mut url = format!("{}/signup", self.auth_url);
        if let Some(redirect) = &credentials.options.email_redirect_to {
            let with_query = Url::parse_with_params(&url, &[("redirect_to", redirect)])
                .map_err(|e| AuthError::InvalidResponseFormat(e.to_string()))?;
            url = with_query.to_string();
        }

        let mut body = Map::new();
        body.insert("email".into(), json!(credentials.credentials.email));
        body.insert("password".into(), json!(credentials.credentials.password));
        if let Some(data) = &credentials.options.data {
            body.insert("data".into(), data.clone());
        }

        let payload = self.send(self.http.post(url).json(&body)).await?;
        parse_auth_payload(payload, unix_now())
    }

    fn finish_auth(&self, result: Result<AuthData>) -> AuthResponse {
        match result {
            Ok(data) => {
                if let Some(session) = &data.session {
                    self.session.set_session(session.clone());
                }
                Envelope::ok(data)
            }
            Err(e) => {
                warn!("❌ Remote auth failed: {}", e);
                Envelope::failure(e.into())
            }
        }
    }
}

/// Interpret a GoTrue token/signup body.
///
/// A body with `access_token` is a full session; otherwise it is a bare user
/// (sign-up awaiting email confirmation), either top-level or under `user`.
pub fn parse_auth_payload(payload: Value, now: i64) -> Result<AuthData> {
    if payload.get("access_token").is_some() {
        let mut session: AuthSession = serde_json::from_value(payload)?;
        if session.expires_at == 0 {
            session.expires_at = now + session.expires_in;
        }
        return Ok(AuthData {
            user: Some(session.user.clone()),
            session: Some(session),
        });
    }

    let user_value = match payload.get("user") {
        Some(user) if !user.is_null() => user.clone(),
        _ => payload,
    };
    if user_value.get("id").is_none() {
        return Err(AuthError::InvalidResponseFormat(
            "response carries neither a session nor a user".to_string(),
        ));
    }
    let user: AuthUser = serde_json::from_value(user_value)?;
    Ok(AuthData {
        user: Some(user),
        session: None,
    })
}

/// Provider authorize URL the caller should open
pub fn authorize_url(auth_url: &str, options: &OAuthOptions) -> Result<String> {
    let mut params = vec![("provider", options.provider.as_str())];
    if let Some(redirect) = options.redirect_to.as_deref() {
        params.push(("redirect_to", redirect));
    }
    Url::parse_with_params(&format!("{}/authorize", auth_url), &params)
        .map(|url| url.to_string())
        .map_err(|e| AuthError::InvalidResponseFormat(e.to_string()))
}

#[async_trait]
impl AuthClient for RemoteAuthClient {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn sign_in_with_password(&self, credentials: Credentials) -> AuthResponse {
        let result = self.password_grant(&credentials).await;
        if result.is_ok() {
            info!("✅ Remote sign-in succeeded");
        }
        self.finish_auth(result)
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.credentials.email))]
    async fn sign_up(&self, credentials: SignUpCredentials) -> AuthResponse {
        let result = self.register(&credentials).await;
        if let Ok(data) = &result {
            info!(
                "✅ Remote sign-up accepted (session issued: {})",
                data.session.is_some()
            );
        }
        self.finish_auth(result)
    }

    async fn sign_out(&self) -> Envelope<()> {
        if self.session.access_token().is_some() {
            let url = format!("{}/logout", self.auth_url);
            if let Err(e) = self.send(self.http.post(url)).await {
                warn!("Remote logout failed, clearing local session anyway: {}", e);
            }
        }
        self.session.clear();
        Envelope::ok(())
    }

    async fn get_user(&self) -> Envelope<UserData> {
        if self.session.access_token().is_none() {
            return Envelope::failure(
                AuthError::AuthenticationRequired("Auth session missing".to_string()).into(),
            );
        }

        let url = format!("{}/user", self.auth_url);
        let result = self
            .send(self.http.get(url))
            .await
            .and_then(|value| serde_json::from_value::<AuthUser>(value).map_err(AuthError::from));
        match result {
            Ok(user) => Envelope::ok(UserData { user: Some(user) }),
            Err(e) => {
                error!("❌ Failed to fetch remote user: {}", e);
                Envelope::failure(e.into())
            }
        }
    }

    async fn get_session(&self) -> Envelope<SessionData> {
        Envelope::ok(SessionData {
            session: self.session.current(),
        })
    }

    async fn sign_in_with_oauth(&self, options: OAuthOptions) -> Envelope<OAuthData> {
        match authorize_url(&self.auth_url, &options) {
            Ok(url) => {
                debug!("OAuth authorize URL for {}: {}", options.provider, url);
                Envelope::ok(OAuthData {
                    provider: options.provider,
                    url: Some(url),
                    user: None,
                    session: None,
                })
            }
            Err(e) => Envelope::with_error(
                OAuthData {
                    provider: options.provider,
                    ..OAuthData::default()
                },
                e.into(),
            ),
        }
    }

    fn session(&self) -> &SessionHolder {
        &self.session
    }

    fn client_type(&self) -> &'static str {
        "remote"
    }
}

impl std::fmt::Debug for RemoteAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteAuthClient")
            .field("auth_url", &self.auth_url)
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::generate_session;
    use crate::models::auth::AuthChangeEvent;
    use crate::storage::MemorySessionStorage;
    use std::sync::Mutex;

    /// Nothing listens on port 9 locally, so any request fails fast
    fn offline_config() -> RemoteConfig {
        RemoteConfig {
            url: Some("http://127.0.0.1:9".to_string()),
            anon_key: Some("anon-key".to_string()),
            timeout_secs: 2,
            ..RemoteConfig::default()
        }
    }

    fn offline_client() -> (Arc<MemorySessionStorage>, RemoteAuthClient) {
        let storage = Arc::new(MemorySessionStorage::new());
        let client = RemoteAuthClient::new(&offline_config(), Client::new(), storage.clone())
            .unwrap();
        (storage, client)
    }

    fn bearer(client: &RemoteAuthClient) -> (String, String) {
        let request = client
            .request(client.http.get("http://127.0.0.1:9/user"))
            .build()
            .unwrap();
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };
        (header("apikey"), header("authorization"))
    }

    #[test]
    fn test_requests_use_anon_key_until_signed_in() {
        let (_storage, client) = offline_client();
        assert_eq!(
            bearer(&client),
            ("anon-key".to_string(), "Bearer anon-key".to_string())
        );

        let session = generate_session(AuthUser::new("member@example.com", "member"), unix_now());
        let token = session.access_token.clone();
        client.session.set_session(session);
        assert_eq!(bearer(&client), ("anon-key".to_string(), format!("Bearer {}", token)));
    }

    #[tokio::test]
    async fn test_get_user_without_session_is_an_error() {
        let (_storage, client) = offline_client();
        let response = client.get_user().await;
        assert!(response.data.user.is_none());
        assert_eq!(response.error_message(), Some("Auth session missing"));
    }

    #[tokio::test]
    async fn test_sign_out_without_session_skips_logout() {
        let (storage, client) = offline_client();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let _sub = client.on_auth_state_change(Box::new(
            move |event: AuthChangeEvent, _session: Option<&AuthSession>| {
                sink.lock().unwrap().push(event)
            },
        ));

        let response = client.sign_out().await;
        assert!(response.error.is_none());
        assert!(storage.get_item(&offline_config().session_key).unwrap().is_none());
        assert_eq!(
            *events.lock().unwrap(),
            vec![AuthChangeEvent::SignedOut, AuthChangeEvent::SignedOut]
        );
    }

    #[tokio::test]
    async fn test_failed_logout_still_clears_local_session() {
        let (storage, client) = offline_client();
        let key = offline_config().session_key;
        client.session.set_session(generate_session(
            AuthUser::new("member@example.com", "member"),
            unix_now(),
        ));
        assert!(storage.get_item(&key).unwrap().is_some());

        let response = client.sign_out().await;
        assert!(response.error.is_none());
        assert!(client.session.current().is_none());
        assert!(storage.get_item(&key).unwrap().is_none());
    }

    fn user_json() -> Value {
        json!({
            "id": "0b6d5b0e-2f7e-4c55-a8c1-54b0f7a3a111",
            "aud": "authenticated",
            "role": "authenticated",
            "email": "member@example.com",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    #[test]
    fn test_session_payload_fills_missing_expiry() {
        let payload = json!({
            "access_token": "jwt",
            "refresh_token": "r",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": user_json()
        });
        let data = parse_auth_payload(payload, 1_000).unwrap();
        let session = data.session.unwrap();
        assert_eq!(session.expires_at, 4_600);
        assert_eq!(data.user.unwrap().email, "member@example.com");
    }

    #[test]
    fn test_unconfirmed_signup_returns_user_only() {
        let data = parse_auth_payload(user_json(), 0).unwrap();
        assert!(data.session.is_none());
        assert_eq!(data.user.unwrap().email, "member@example.com");

        let data = parse_auth_payload(json!({ "user": user_json(), "session": null }), 0).unwrap();
        assert!(data.user.is_some());
    }

    #[test]
    fn test_unrecognized_payload_is_an_error() {
        let err = parse_auth_payload(json!({ "ok": true }), 0).unwrap_err();
        assert_eq!(err.category(), "invalid_response");
    }

    #[test]
    fn test_authorize_url_encodes_params() {
        let mut options = OAuthOptions::new("google");
        options.redirect_to = Some("https://app.example.com/cb?x=1".to_string());
        let url = authorize_url("https://demo.supabase.co/auth/v1", &options).unwrap();
        assert_eq!(
            url,
            concat!(
                "https://demo.supabase.co/auth/v1/authorize?provider=google",
                "&redirect_to=https%3A%2F%2Fapp.example.com%2Fcb%3Fx%3D1"
            )
        );
    }
}
