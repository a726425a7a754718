//! Spotify token endpoint client.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{OAuthError, SpotifyOAuthConfig};

/// Longest access-token lifetime accepted from the token endpoint.
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 366 * 24 * 60 * 60;

/// Raw success body from the token endpoint.
#[derive(Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Tokens granted by the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime of `access_token` from the moment it was granted.
    pub expires_in: Duration,
    /// Present on code exchange, and on refresh when the provider rotates it.
    pub refresh_token: Option<String>,
    pub scopes: Vec<String>,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl TokenGrant {
    fn from_response(
        operation: &'static str,
        body: TokenEndpointResponse,
    ) -> Result<Self, OAuthError> {
        if body.access_token.is_empty() {
            return Err(OAuthError::Malformed {
                operation,
                message: "empty access_token".into(),
            });
        }
        let expires_in = (0..=MAX_TOKEN_LIFETIME_SECS)
            .contains(&body.expires_in)
            .then(|| Duration::try_seconds(body.expires_in))
            .flatten()
            .ok_or_else(|| OAuthError::Malformed {
                operation,
                message: format!("expires_in out of range: {}", body.expires_in),
            })?;
        Ok(Self {
            access_token: body.access_token,
            expires_in,
            refresh_token: body.refresh_token.filter(|t| !t.is_empty()),
            scopes: body
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}

impl TokenGrant {
    /// Absolute expiry of `access_token` when granted at `now`.
    pub fn expires_at_from(
        &self,
        operation: &'static str,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, OAuthError> {
        now.checked_add_signed(self.expires_in)
            .ok_or_else(|| OAuthError::Malformed {
                operation,
                message: format!("expires_in out of range: {}s", self.expires_in.num_seconds()),
            })
    }
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError>;
}

/// OAuth client for the Spotify accounts service.
///
/// Construct once at startup and share; the inner `reqwest::Client` keeps a
/// connection pool.
#[derive(Clone)]
pub struct SpotifyAuthClient {
    config: SpotifyOAuthConfig,
    http: reqwest::Client,
}

impl SpotifyAuthClient {
    pub fn new(config: SpotifyOAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a shared HTTP client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn config(&self) -> &SpotifyOAuthConfig {
        &self.config
    }

    /// Authorize URL the browser is redirected to at sign-in.
    pub fn authorization_url(&self, state: &str, code_challenge: &str) -> Url {
        let scope = self.config.scopes.join(" ");
        let mut url = self.config.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("scope", &scope)
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        url
    }

    /// Exchange an authorization code (with its PKCE verifier) for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenGrant, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ];
        self.post_token("code exchange", &params).await
    }

    async fn post_token(
        &self,
        operation: &'static str,
        params: &[(&str, &str)],
    ) -> Result<TokenGrant, OAuthError> {
        if !self.config.has_client_credentials() {
            return Err(OAuthError::Config(
                "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are required".into(),
            ));
        }

        let resp = self
            .http
            .post(self.config.token_url.clone())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(params)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(operation, status = %status, "token endpoint rejected request");
            return Err(OAuthError::Rejected {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .json::<TokenEndpointResponse>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OAuthError::Timeout { operation }
                } else {
                    OAuthError::Malformed {
                        operation,
                        message: e.to_string(),
                    }
                }
            })?;
        TokenGrant::from_response(operation, body)
    }
}

#[async_trait]
impl TokenRefresher for SpotifyAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        self.post_token("token refresh", &params).await
    }
}

fn transport_error(operation: &'static str, e: reqwest::Error) -> OAuthError {
    if e.is_timeout() {
        OAuthError::Timeout { operation }
    } else {
        OAuthError::Transport {
            operation,
            message: e.to_string(),
        }
    }
}
