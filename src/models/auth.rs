use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::models::response::Envelope;

/// Authenticated user as issued by either backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,

    #[serde(default)]
    pub email: String,

    /// Application role (`admin`, `merchant`, `customer`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Audience claim, `authenticated` for signed-in users
    #[serde(default = "default_aud")]
    pub aud: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_aud() -> String {
    "authenticated".to_string()
}

impl AuthUser {
    /// Fabricate a fresh user with a new identifier
    pub fn new(email: impl Into<String>, role: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            role: Some(role.into()),
            aud: default_aud(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }
}

/// Bearer-token pair plus expiry and the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: String,

    /// Lifetime in seconds
    pub expires_in: i64,

    /// Absolute expiry, unix seconds. Older servers omit it.
    #[serde(default)]
    pub expires_at: i64,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl AuthSession {
    /// Whether the session is no longer usable at `now` (unix seconds)
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Event delivered to auth state observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
}

impl AuthChangeEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthChangeEvent::SignedIn => "SIGNED_IN",
            AuthChangeEvent::SignedOut => "SIGNED_OUT",
        }
    }
}

impl fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `data` payload of sign-in and sign-up responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthData {
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub session: Option<AuthSession>,
}

/// `data` payload of an OAuth sign-in.
///
/// The hosted backend answers with the provider's authorize URL; the local
/// stub fabricates a session right away.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthData {
    pub provider: String,
    pub url: Option<String>,
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
}

pub type AuthResponse = Envelope<AuthData>;

/// Email/password pair
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUpOptions {
    /// Profile metadata attached to the new user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_redirect_to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignUpCredentials {
    pub credentials: Credentials,
    pub options: SignUpOptions,
}

impl SignUpCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(email, password),
            options: SignUpOptions::default(),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.options.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthOptions {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl OAuthOptions {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            redirect_to: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_wire_names() {
        assert_eq!(AuthChangeEvent::SignedIn.to_string(), "SIGNED_IN");
        assert_eq!(
            serde_json::to_value(AuthChangeEvent::SignedOut).unwrap(),
            json!("SIGNED_OUT")
        );
    }

    #[test]
    fn test_session_parses_gotrue_payload_without_expires_at() {
        let payload = json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r",
            "user": {
                "id": "6f1c2b9e-4a43-4a7e-9a44-0b1a0c7d1e11",
                "aud": "authenticated",
                "email": "a@b.com",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "app_metadata": {"provider": "email"}
            }
        });
        let session: AuthSession = serde_json::from_value(payload).unwrap();
        assert_eq!(session.expires_at, 0);
        assert_eq!(session.user.email, "a@b.com");
        assert!(session.user.role.is_none());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.com", "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
