use sha2::{Digest, Sha256};

use crate::config::constants::LOCAL_SESSION_TTL_SECS;
use crate::models::auth::{AuthSession, AuthUser};

/// Build a synthetic one-hour session for `user`, issued at `now` (unix seconds)
pub fn generate_session(user: AuthUser, now: i64) -> AuthSession {
    AuthSession {
        access_token: format!("local-token-{}-{}", user.id, now),
        refresh_token: format!("local-refresh-{}-{}", user.id, now),
        expires_in: LOCAL_SESSION_TTL_SECS,
        expires_at: now + LOCAL_SESSION_TTL_SECS,
        token_type: "bearer".to_string(),
        user,
    }
}

/// Hex SHA-256 of `password` with a fixed suffix salt.
///
/// The local sign-in path compares plaintext against the built-in admin
/// credential and never calls this. It is not a password store.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(b"salt");
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_shape() {
        let user = AuthUser::new("a@b.com", "admin");
        let id = user.id;
        let session = generate_session(user, 1_700_000_000);

        assert_eq!(session.access_token, format!("local-token-{}-1700000000", id));
        assert_eq!(session.refresh_token, format!("local-refresh-{}-1700000000", id));
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.expires_at, 1_700_003_600);
        assert_eq!(session.token_type, "bearer");
        assert!(!session.is_expired_at(1_700_003_599));
        assert!(session.is_expired_at(1_700_003_600));
    }

    #[test]
    fn test_hash_password_is_hex_sha256_with_suffix() {
        let hash = hash_password("admin123!");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hex::encode(Sha256::digest(b"admin123!salt")));
        assert_ne!(hash, hash_password("admin123"));
    }
}
