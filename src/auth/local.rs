use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::session::SessionHolder;
use crate::auth::token::generate_session;
use crate::auth::{AuthClient, AuthError};
use crate::config::constants::{
    LOCAL_ADMIN_EMAIL, LOCAL_ADMIN_PASSWORD, LOCAL_OAUTH_EMAIL, LOCAL_SESSION_KEY,
};
use crate::models::auth::{
    AuthData, AuthResponse, AuthUser, Credentials, OAuthData, OAuthOptions, SessionData,
    SignUpCredentials, UserData,
};
use crate::models::response::Envelope;
use crate::storage::SessionStorage;
use crate::utils::time::unix_now;

/// In-process auth stub for local development.
///
/// Only the built-in admin credential signs in. Sign-up and OAuth always
/// succeed with a fabricated user. Tokens are synthetic and never verified.
#[derive(Debug)]
pub struct LocalAuthClient {
    session: SessionHolder,
}

impl LocalAuthClient {
    /// Create a client restoring any session persisted under `local-auth-session`
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            session: SessionHolder::new(storage, LOCAL_SESSION_KEY),
        }
    }

    fn start_session(&self, user: AuthUser) -> AuthData {
        let session = generate_session(user.clone(), unix_now());
        self.session.set_session(session.clone());
        AuthData {
            user: Some(user),
            session: Some(session),
        }
    }
}

#[async_trait]
impl AuthClient for LocalAuthClient {
    async fn sign_in_with_password(&self, credentials: Credentials) -> AuthResponse {
        if credentials.email != LOCAL_ADMIN_EMAIL || credentials.password != LOCAL_ADMIN_PASSWORD {
            warn!("❌ Local sign-in rejected for {}", credentials.email);
            return Envelope::failure(AuthError::InvalidCredentials.into());
        }

        let data = self.start_session(AuthUser::new(credentials.email, "admin"));
        info!("✅ Local sign-in succeeded for {}", LOCAL_ADMIN_EMAIL);
        Envelope::ok(data)
    }

    async fn sign_up(&self, credentials: SignUpCredentials) -> AuthResponse {
        let SignUpCredentials {
            credentials,
            options,
        } = credentials;
        if let Some(profile) = &options.data {
            debug!("Local sign-up profile data for {}: {}", credentials.email, profile);
        }

        let data = self.start_session(AuthUser::new(credentials.email, "merchant"));
        info!(
            "✅ Local sign-up created merchant {}",
            data.user.as_ref().map(|u| u.email.as_str()).unwrap_or_default()
        );
        Envelope::ok(data)
    }

    async fn sign_out(&self) -> Envelope<()> {
        self.session.clear();
        info!("Local session signed out");
        Envelope::ok(())
    }

    async fn get_user(&self) -> Envelope<UserData> {
        Envelope::ok(UserData {
            user: self.session.current_user(),
        })
    }

    async fn get_session(&self) -> Envelope<SessionData> {
        Envelope::ok(SessionData {
            session: self.session.current(),
        })
    }

    async fn sign_in_with_oauth(&self, options: OAuthOptions) -> Envelope<OAuthData> {
        debug!("Local OAuth ignores provider '{}'", options.provider);
        let data = self.start_session(AuthUser::new(LOCAL_OAUTH_EMAIL, "customer"));
        info!("✅ Local OAuth sign-in as {}", LOCAL_OAUTH_EMAIL);
        Envelope::ok(OAuthData {
            provider: options.provider,
            url: None,
            user: data.user,
            session: data.session,
        })
    }

    fn session(&self) -> &SessionHolder {
        &self.session
    }

    fn client_type(&self) -> &'static str {
        "local"
    }
}
