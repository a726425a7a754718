//! Spotify OAuth support.
//!
//! Provides PKCE helpers, pending sign-in state, and the token endpoint
//! client used both for the authorization-code exchange at sign-in and for
//! refreshing expired access tokens.

pub mod client;
pub mod pkce;
pub mod state;

use std::time::Duration;

use thiserror::Error;
use url::Url;

pub use client::{SpotifyAuthClient, TokenGrant, TokenRefresher};
pub use state::{OAuthStateStore, PendingSignIn, PendingSignInsFull};

/// Default Spotify authorization endpoint.
pub const SPOTIFY_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
/// Default Spotify token endpoint.
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Scopes requested at sign-in.
pub const SPOTIFY_SCOPES: &[&str] = &[
    "user-read-email",
    "user-read-private",
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "user-read-recently-played",
    "user-read-playback-position",
    "playlist-read-private",
    "playlist-read-collaborative",
    "streaming",
];

/// Default bound on a single token endpoint call.
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("{operation} rejected with HTTP {status}: {body}")]
    Rejected {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    #[error("{operation} transport error: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} returned a malformed body: {message}")]
    Malformed {
        operation: &'static str,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Application credentials and endpoints for Spotify OAuth.
#[derive(Debug, Clone)]
pub struct SpotifyOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub authorize_url: Url,
    pub token_url: Url,
    pub scopes: Vec<String>,
    pub request_timeout: Duration,
}

impl SpotifyOAuthConfig {
    /// Config with Spotify's public endpoints and the default scope list.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Url,
    ) -> Result<Self, OAuthError> {
        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri,
            authorize_url: parse_url(SPOTIFY_AUTHORIZE_URL)?,
            token_url: parse_url(SPOTIFY_TOKEN_URL)?,
            scopes: SPOTIFY_SCOPES.iter().map(|s| s.to_string()).collect(),
            request_timeout: DEFAULT_TOKEN_TIMEOUT,
        })
    }

    /// Override the token endpoint (tests point this at a mock server).
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    pub fn with_authorize_url(mut self, url: Url) -> Self {
        self.authorize_url = url;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Whether both halves of the client credentials are present.
    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

fn parse_url(raw: &str) -> Result<Url, OAuthError> {
    raw.parse()
        .map_err(|e| OAuthError::Config(format!("invalid URL {raw}: {e}")))
}
