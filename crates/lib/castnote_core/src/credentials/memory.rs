//! In-process credential store.
//!
//! Backs local development without PostgreSQL and the API tests. Records are
//! lost when the process exits.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CredentialError, CredentialStore};
use crate::models::credential::{CredentialRecord, TokenUpdate};

/// Credential store keyed by `(user_id, provider)` in a concurrent map.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: DashMap<(String, String), CredentialRecord>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        Ok(self
            .records
            .get(&(user_id.to_string(), provider.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn update(
        &self,
        user_id: &str,
        provider: &str,
        update: &TokenUpdate,
    ) -> Result<(), CredentialError> {
        let mut record = self
            .records
            .get_mut(&(user_id.to_string(), provider.to_string()))
            .ok_or_else(|| CredentialError::NotFound {
                user_id: user_id.to_string(),
                provider: provider.to_string(),
            })?;
        record.access_token = update.access_token.clone();
        // expires_at never moves backwards
        record.expires_at = record.expires_at.max(update.expires_at);
        if let Some(refresh_token) = &update.refresh_token {
            record.refresh_token = refresh_token.clone();
        }
        Ok(())
    }

    async fn upsert(&self, record: &CredentialRecord) -> Result<(), CredentialError> {
        self.records.insert(
            (record.user_id.clone(), record.provider.clone()),
            record.clone(),
        );
        Ok(())
    }
}
