//! Session JWT generation and verification.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{debug, info, warn};

use super::AuthError;
use crate::models::auth::SessionClaims;

/// App session lifetime: 30 days.
pub const SESSION_EXPIRY_SECS: i64 = 30 * 24 * 60 * 60;

/// Generate a signed session JWT (HS256, 30 day expiry).
pub fn generate_session_token(user_id: &str, secret: &[u8]) -> Result<String, AuthError> {
    if user_id.is_empty() {
        return Err(AuthError::ValidationError("empty user id".into()));
    }
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: (now + Duration::seconds(SESSION_EXPIRY_SECS)).timestamp(),
        iat: now.timestamp(),
    };
    let key = EncodingKey::from_secret(secret);
    encode(&Header::default(), &claims, &key)
        .map_err(|e| AuthError::TokenError(format!("session token encode: {e}")))
}

/// Verify a session JWT, returning the claims on success.
pub fn verify_session_token(token: &str, secret: &[u8]) -> Option<SessionClaims> {
    // HS256 with exp checked; any failure is just "not signed in".
    let validation = Validation::default();
    match decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            debug!(error = %e, "session token rejected");
            None
        }
    }
}

const SECRET_ENV_VARS: [&str; 2] = ["JWT_SECRET", "AUTH_SECRET"];
const GENERATED_SECRET_LEN: usize = 64;

/// Session signing secret.
///
/// Taken from `JWT_SECRET` or `AUTH_SECRET` when set. Otherwise a random
/// secret is generated once and kept under the user data dir so sessions
/// survive restarts.
pub fn resolve_jwt_secret() -> String {
    let from_env = SECRET_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty());
    if let Some(secret) = from_env {
        return secret;
    }

    let path = persisted_secret_path();
    match std::fs::read_to_string(&path) {
        Ok(stored) if !stored.trim().is_empty() => stored.trim().to_string(),
        _ => {
            let secret = random_secret();
            if let Err(e) = persist_secret(&path, &secret) {
                warn!(path = %path.display(), error = %e, "could not persist session secret");
            } else {
                info!(path = %path.display(), "generated session secret");
            }
            secret
        }
    }
}

fn random_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect()
}

fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, secret)
}

fn persisted_secret_path() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("castnote").join("session-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn session_token_round_trips_subject() {
        let token = generate_session_token("user-1", SECRET).unwrap();
        let claims = verify_session_token(&token, SECRET).expect("valid token");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, SESSION_EXPIRY_SECS);
    }

    #[test]
    fn session_token_rejected_with_wrong_secret() {
        let token = generate_session_token("user-1", SECRET).unwrap();
        assert!(verify_session_token(&token, b"other-secret").is_none());
    }

    #[test]
    fn expired_session_token_rejected() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: "user-1".into(),
            exp: (now - Duration::hours(1)).timestamp(),
            iat: (now - Duration::hours(2)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET))
            .unwrap();
        assert!(verify_session_token(&token, SECRET).is_none());
    }

    #[test]
    fn empty_user_id_is_rejected() {
        assert!(matches!(
            generate_session_token("", SECRET),
            Err(AuthError::ValidationError(_))
        ));
    }
}
