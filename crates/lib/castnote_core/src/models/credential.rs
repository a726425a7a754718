//! Provider credential models.

use std::fmt;

use chrono::{DateTime, Utc};

/// Provider name for Spotify credentials.
pub const SPOTIFY_PROVIDER: &str = "spotify";

/// Persisted token state for one `(user_id, provider)` pair.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user_id: String,
    pub provider: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Whether `access_token` may still be handed out at `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }

    /// Whether a refresh can be attempted at all.
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

// Tokens stay out of logs.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("user_id", &self.user_id)
            .field("provider", &self.provider)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Fields written back to the store after a successful refresh.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenUpdate {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// Set only when the provider rotated the refresh token.
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenUpdate")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("refresh_token_rotated", &self.refresh_token.is_some())
            .finish()
    }
}
