//! Auth clients: the in-process stub and the hosted GoTrue client.

pub mod local;
pub mod remote;
pub mod session;
pub mod token;

use async_trait::async_trait;

use crate::models::auth::{
    AuthResponse, Credentials, OAuthData, OAuthOptions, SessionData, SignUpCredentials, UserData,
};
use crate::models::response::{Envelope, ErrorInfo};

pub use local::LocalAuthClient;
pub use remote::RemoteAuthClient;
pub use session::{AuthCallback, SessionHolder, Subscription};

/// Authentication error enumeration
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Service(ErrorInfo),

    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),

    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

/// Authentication result type
pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    pub fn category(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AuthenticationRequired(_) => "auth_required",
            AuthError::Network(_) => "network",
            AuthError::Service(_) => "service",
            AuthError::InvalidResponseFormat(_) => "invalid_response",
            AuthError::Unsupported(_) => "not_supported",
        }
    }

    /// Flatten into an envelope error; service errors pass through untouched
    pub fn into_error_info(self) -> ErrorInfo {
        match self {
            AuthError::Service(info) => info,
            other => ErrorInfo::new(other.to_string()).with_code(other.category()),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::InvalidResponseFormat(err.to_string())
        } else {
            AuthError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(err: serde_json::Error) -> Self {
        AuthError::InvalidResponseFormat(err.to_string())
    }
}

impl From<AuthError> for ErrorInfo {
    fn from(err: AuthError) -> Self {
        err.into_error_info()
    }
}

/// The `auth` surface of a database handle.
///
/// Every method reports failure through the envelope; none of them panic or
/// return `Err`.
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn sign_in_with_password(&self, credentials: Credentials) -> AuthResponse;

    async fn sign_up(&self, credentials: SignUpCredentials) -> AuthResponse;

    /// Clears local state even if the server call fails
    async fn sign_out(&self) -> Envelope<()>;

    async fn get_user(&self) -> Envelope<UserData>;

    async fn get_session(&self) -> Envelope<SessionData>;

    async fn sign_in_with_oauth(&self, options: OAuthOptions) -> Envelope<OAuthData>;

    /// Invoke `callback` now with the current state and on every change after
    fn on_auth_state_change(&self, callback: AuthCallback) -> Subscription {
        self.session().subscribe(callback)
    }

    /// Session state shared with the data backend
    fn session(&self) -> &SessionHolder;

    /// Bearer token of the current session, if any
    fn access_token(&self) -> Option<String> {
        self.session().access_token()
    }

    fn client_type(&self) -> &'static str;
}
