//! Session Token Store.
//!
//! Persists one [`CredentialRecord`] per `(user_id, provider)`. The store is the
//! only owner of persistence; the refresh coordinator reads and updates records
//! through [`CredentialStore`] but never creates them (the sign-in flow does).

pub mod crypto;
pub mod memory;
pub mod pg;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::credential::{CredentialRecord, TokenUpdate};

pub use memory::MemoryCredentialStore;
pub use pg::PgCredentialStore;

/// Credential persistence errors.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("No credential for user {user_id} and provider {provider}")]
    NotFound { user_id: String, provider: String },

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Storage for provider credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the record for a user and provider.
    async fn find(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError>;

    /// Write refreshed token fields in place. Fails with `NotFound` when the
    /// record does not exist; refreshes never create records.
    async fn update(
        &self,
        user_id: &str,
        provider: &str,
        update: &TokenUpdate,
    ) -> Result<(), CredentialError>;

    /// Create or replace a record after a successful sign-in.
    async fn upsert(&self, record: &CredentialRecord) -> Result<(), CredentialError>;
}
