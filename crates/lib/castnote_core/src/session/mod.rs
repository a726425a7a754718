//! Session materialization.
//!
//! [`SessionMaterializer::materialize_session`] turns a user id into a
//! [`SessionView`]: the user's current Spotify access token, or a marker saying
//! why there is none. It never fails; callers branch on token presence.

pub mod refresh;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

use crate::credentials::CredentialStore;
use crate::models::credential::SPOTIFY_PROVIDER;
use crate::oauth::TokenRefresher;

pub use refresh::{RefreshError, TokenRefreshCoordinator, ValidToken};

/// Why a session carries no access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMarker {
    /// The user never connected a provider account.
    Unauthenticated,
    /// Stored credentials could not be refreshed; sign in again.
    ReauthRequired,
}

/// Per-request authentication result handed to callers.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<SessionMarker>,
}

impl SessionView {
    pub fn authenticated(user_id: impl Into<String>, token: ValidToken) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: Some(token.access_token),
            expires_at: Some(token.expires_at),
            error: None,
        }
    }

    pub fn unauthenticated(user_id: impl Into<String>) -> Self {
        Self::without_token(user_id, SessionMarker::Unauthenticated)
    }

    pub fn reauth_required(user_id: impl Into<String>) -> Self {
        Self::without_token(user_id, SessionMarker::ReauthRequired)
    }

    fn without_token(user_id: impl Into<String>, marker: SessionMarker) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: None,
            expires_at: None,
            error: Some(marker),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn error(&self) -> Option<SessionMarker> {
        self.error
    }
}

impl fmt::Debug for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionView")
            .field("user_id", &self.user_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .field("error", &self.error)
            .finish()
    }
}

/// Builds [`SessionView`]s from stored credentials.
///
/// Created once at startup and shared across requests.
pub struct SessionMaterializer {
    store: Arc<dyn CredentialStore>,
    coordinator: TokenRefreshCoordinator,
    provider: String,
}

impl SessionMaterializer {
    /// Materializer for Spotify credentials.
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            coordinator: TokenRefreshCoordinator::new(Arc::clone(&store), refresher),
            store,
            provider: SPOTIFY_PROVIDER.to_string(),
        }
    }

    pub fn coordinator(&self) -> &TokenRefreshCoordinator {
        &self.coordinator
    }

    /// Load the user's credential and return a session with a valid token,
    /// refreshing it first when needed.
    pub async fn materialize_session(&self, user_id: &str) -> SessionView {
        let record = match self.store.find(user_id, &self.provider).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(user_id, provider = %self.provider, "no stored credential");
                return SessionView::unauthenticated(user_id);
            }
            Err(e) => {
                error!(user_id, provider = %self.provider, "credential lookup failed: {e}");
                return SessionView::reauth_required(user_id);
            }
        };

        match self.coordinator.ensure_valid_token(&record).await {
            Ok(token) => SessionView::authenticated(user_id, token),
            Err(e) => {
                debug!(user_id, "session requires re-authentication: {e}");
                SessionView::reauth_required(user_id)
            }
        }
    }
}
