//! API server configuration.

use std::time::Duration;

use castnote_core::auth::jwt::resolve_jwt_secret;
use castnote_core::oauth::{DEFAULT_TOKEN_TIMEOUT, OAuthError, SpotifyOAuthConfig};
use url::Url;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret for app session tokens.
    pub jwt_secret: String,
    /// Passphrase for encrypting stored provider tokens.
    pub token_encryption_key: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    /// Unset means placeholder summaries.
    pub gemini_api_key: Option<String>,
    /// Bound on a single token refresh call.
    pub token_refresh_timeout: Duration,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                     | Default                                        |
    /// |------------------------------|------------------------------------------------|
    /// | `BIND_ADDR`                  | `127.0.0.1:3100`                               |
    /// | `DATABASE_URL`               | `postgres://localhost:5432/castnote`           |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file                  |
    /// | `TOKEN_ENCRYPTION_KEY`       | development key                                |
    /// | `SPOTIFY_CLIENT_ID`          | empty (sign-in and refresh disabled)           |
    /// | `SPOTIFY_CLIENT_SECRET`      | empty                                          |
    /// | `SPOTIFY_REDIRECT_URI`       | `http://127.0.0.1:3100/auth/spotify/callback`  |
    /// | `GEMINI_API_KEY`             | unset                                          |
    /// | `TOKEN_REFRESH_TIMEOUT_SECS` | `5`                                            |
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3100".into()),
            pg_connection_url: var("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/castnote".into()),
            jwt_secret: resolve_jwt_secret(),
            token_encryption_key: var("TOKEN_ENCRYPTION_KEY")
                .unwrap_or_else(|| "castnote-default-dev-key-change-in-production".into()),
            spotify_client_id: var("SPOTIFY_CLIENT_ID").unwrap_or_default(),
            spotify_client_secret: var("SPOTIFY_CLIENT_SECRET").unwrap_or_default(),
            spotify_redirect_uri: var("SPOTIFY_REDIRECT_URI")
                .unwrap_or_else(|| "http://127.0.0.1:3100/auth/spotify/callback".into()),
            gemini_api_key: var("GEMINI_API_KEY"),
            token_refresh_timeout: var("TOKEN_REFRESH_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TOKEN_TIMEOUT),
        }
    }

    /// Spotify OAuth settings derived from this config.
    pub fn spotify_oauth(&self) -> Result<SpotifyOAuthConfig, OAuthError> {
        let redirect_uri = self
            .spotify_redirect_uri
            .parse::<Url>()
            .map_err(|e| OAuthError::Config(format!("invalid SPOTIFY_REDIRECT_URI: {e}")))?;
        Ok(SpotifyOAuthConfig::new(
            self.spotify_client_id.as_str(),
            self.spotify_client_secret.as_str(),
            redirect_uri,
        )?
        .with_request_timeout(self.token_refresh_timeout))
    }
}
