//! PostgreSQL credential store.
//!
//! Tokens are encrypted with [`super::crypto`] before they reach the
//! `provider_credentials` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::crypto::{decrypt_token, encrypt_token};
use super::{CredentialError, CredentialStore};
use crate::models::credential::{CredentialRecord, TokenUpdate};

/// Credential store backed by the `provider_credentials` table.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
    encryption_key: String,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool, encryption_key: impl Into<String>) -> Self {
        Self {
            pool,
            encryption_key: encryption_key.into(),
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        let row = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
            r#"
            SELECT access_token_encrypted, refresh_token_encrypted, expires_at
            FROM provider_credentials
            WHERE user_id = $1::uuid AND provider = $2
            "#,
        )
        .bind(user_id)
        .bind(provider)
        .fetch_optional(&self.pool)
        .await?;

        let Some((access_encrypted, refresh_encrypted, expires_at)) = row else {
            return Ok(None);
        };

        Ok(Some(CredentialRecord {
            user_id: user_id.to_string(),
            provider: provider.to_string(),
            access_token: decrypt_token(&access_encrypted, &self.encryption_key)?,
            refresh_token: decrypt_token(&refresh_encrypted, &self.encryption_key)?,
            expires_at,
        }))
    }

    async fn update(
        &self,
        user_id: &str,
        provider: &str,
        update: &TokenUpdate,
    ) -> Result<(), CredentialError> {
        let access_encrypted = encrypt_token(&update.access_token, &self.encryption_key)?;
        let refresh_encrypted = update
            .refresh_token
            .as_deref()
            .map(|t| encrypt_token(t, &self.encryption_key))
            .transpose()?;

        let result = sqlx::query(
            r#"
            UPDATE provider_credentials
            SET access_token_encrypted = $3,
                refresh_token_encrypted = COALESCE($4, refresh_token_encrypted),
                expires_at = GREATEST(expires_at, $5),
                updated_at = now()
            WHERE user_id = $1::uuid AND provider = $2
            "#,
        )
        .bind(user_id)
        .bind(provider)
        .bind(access_encrypted)
        .bind(refresh_encrypted)
        .bind(update.expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CredentialError::NotFound {
                user_id: user_id.to_string(),
                provider: provider.to_string(),
            });
        }
        Ok(())
    }

    async fn upsert(&self, record: &CredentialRecord) -> Result<(), CredentialError> {
        let access_encrypted = encrypt_token(&record.access_token, &self.encryption_key)?;
        let refresh_encrypted = encrypt_token(&record.refresh_token, &self.encryption_key)?;

        sqlx::query(
            r#"
            INSERT INTO provider_credentials
                (user_id, provider, access_token_encrypted, refresh_token_encrypted, expires_at)
            VALUES ($1::uuid, $2, $3, $4, $5)
            ON CONFLICT (user_id, provider)
            DO UPDATE SET access_token_encrypted = EXCLUDED.access_token_encrypted,
                          refresh_token_encrypted = EXCLUDED.refresh_token_encrypted,
                          expires_at = EXCLUDED.expires_at,
                          updated_at = now()
            "#,
        )
        .bind(&record.user_id)
        .bind(&record.provider)
        .bind(access_encrypted)
        .bind(refresh_encrypted)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
