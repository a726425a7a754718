//! Token Refresh Coordinator.
//!
//! Hands out the stored access token while it is fresh, and otherwise
//! exchanges the refresh token with the provider and writes the new token back
//! before returning it. Refreshes for the same `(user_id, provider)` are
//! serialized so concurrent requests cause a single provider call.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::credentials::{CredentialError, CredentialStore};
use crate::models::credential::{CredentialRecord, TokenUpdate};
use crate::oauth::{OAuthError, TokenRefresher};

/// Why a valid access token could not be produced.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("No refresh token on record")]
    MissingRefreshToken,

    #[error("Provider refresh failed: {0}")]
    Provider(#[from] OAuthError),

    #[error("Credential lookup failed: {0}")]
    StoreRead(CredentialError),

    /// The provider issued a token but it could not be persisted. The token is
    /// discarded so the next request refreshes again.
    #[error("Refreshed token could not be persisted: {0}")]
    StoreWrite(CredentialError),
}

/// An access token that may be used until `expires_at`.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&CredentialRecord> for ValidToken {
    fn from(record: &CredentialRecord) -> Self {
        Self {
            access_token: record.access_token.clone(),
            expires_at: record.expires_at,
        }
    }
}

impl fmt::Debug for ValidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

type LockKey = (String, String);

pub struct TokenRefreshCoordinator {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
}

impl TokenRefreshCoordinator {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            locks: DashMap::new(),
        }
    }

    /// Return a usable access token for `record`, refreshing it if expired.
    ///
    /// A fresh record costs nothing: no store access, no network call. A stale
    /// one costs at most one provider call and one store write, the write only
    /// on success. Nothing is retried.
    pub async fn ensure_valid_token(
        &self,
        record: &CredentialRecord,
    ) -> Result<ValidToken, RefreshError> {
        if record.is_fresh_at(Utc::now()) {
            return Ok(ValidToken::from(record));
        }

        let key = (record.user_id.clone(), record.provider.clone());
        let lock = Arc::clone(self.locks.entry(key.clone()).or_default().value());

        let result = {
            let _guard = lock.lock().await;
            self.refresh_locked(record).await
        };

        // Drop the lock entry once no other request is waiting on it.
        self.locks
            .remove_if(&key, |_, l| Arc::strong_count(l) <= 2);

        result
    }

    async fn refresh_locked(&self, record: &CredentialRecord) -> Result<ValidToken, RefreshError> {
        // Another request may have refreshed while this one waited.
        let current = self
            .store
            .find(&record.user_id, &record.provider)
            .await
            .map_err(RefreshError::StoreRead)?
            .unwrap_or_else(|| record.clone());

        if current.is_fresh_at(Utc::now()) {
            debug!(user_id = %current.user_id, "token already refreshed by a concurrent request");
            return Ok(ValidToken::from(&current));
        }

        if !current.has_refresh_token() {
            return Err(RefreshError::MissingRefreshToken);
        }

        let grant = self
            .refresher
            .refresh(&current.refresh_token)
            .await
            .inspect_err(|e| {
                warn!(user_id = %current.user_id, provider = %current.provider, "token refresh failed: {e}");
            })?;

        // Monotonic even if the provider reports a zero lifetime.
        let expires_at = grant
            .expires_at_from("token refresh", Utc::now())
            .inspect_err(|e| {
                warn!(user_id = %current.user_id, provider = %current.provider, "token refresh failed: {e}");
            })?
            .max(current.expires_at);
        let update = TokenUpdate {
            access_token: grant.access_token,
            expires_at,
            refresh_token: grant.refresh_token,
        };

        if let Err(e) = self
            .store
            .update(&current.user_id, &current.provider, &update)
            .await
        {
            error!(user_id = %current.user_id, provider = %current.provider, "refreshed token not persisted: {e}");
            return Err(RefreshError::StoreWrite(e));
        }

        info!(
            user_id = %current.user_id,
            provider = %current.provider,
            expires_at = %expires_at,
            rotated = update.refresh_token.is_some(),
            "access token refreshed"
        );
        Ok(ValidToken {
            access_token: update.access_token,
            expires_at,
        })
    }

    /// Number of `(user_id, provider)` pairs with a refresh in flight.
    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}
