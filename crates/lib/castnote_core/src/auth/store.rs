//! User persistence behind a trait, so the sign-in flow can run without
//! PostgreSQL.

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;

use super::AuthError;
use super::queries::{get_user_by_id, upsert_spotify_user};
use crate::models::auth::User;
use crate::uuid::uuidv7;

/// Storage for local users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the user for a Spotify account, or refresh its profile fields.
    /// The local id is stable across sign-ins.
    async fn upsert_spotify_user(
        &self,
        spotify_id: &str,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AuthError>;

    async fn find(&self, user_id: &str) -> Result<Option<User>, AuthError>;
}

/// User store backed by the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn upsert_spotify_user(
        &self,
        spotify_id: &str,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AuthError> {
        upsert_spotify_user(&self.pool, spotify_id, display_name, email).await
    }

    async fn find(&self, user_id: &str) -> Result<Option<User>, AuthError> {
        get_user_by_id(&self.pool, user_id).await
    }
}

/// In-process user store keyed by Spotify id.
#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<String, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn upsert_spotify_user(
        &self,
        spotify_id: &str,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AuthError> {
        if spotify_id.is_empty() {
            return Err(AuthError::ValidationError("empty Spotify id".into()));
        }
        let mut entry = self
            .users
            .entry(spotify_id.to_string())
            .or_insert_with(|| User {
                id: uuidv7().to_string(),
                spotify_id: spotify_id.to_string(),
                display_name: None,
                email: None,
            });
        entry.display_name = display_name.map(str::to_string);
        entry.email = email.map(str::to_string);
        Ok(entry.value().clone())
    }

    async fn find(&self, user_id: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_keeps_id_and_updates_profile() {
        let store = MemoryUserStore::new();
        let first = store
            .upsert_spotify_user("spotify-1", Some("Old"), None)
            .await
            .unwrap();
        let second = store
            .upsert_spotify_user("spotify-1", Some("New"), Some("a@example.com"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.display_name.as_deref(), Some("New"));
        assert_eq!(store.len(), 1);

        let found = store.find(&first.id).await.unwrap().unwrap();
        assert_eq!(found.email.as_deref(), Some("a@example.com"));
        assert!(store.find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_spotify_id_is_rejected() {
        let store = MemoryUserStore::new();
        let err = store.upsert_spotify_user("", None, None).await.unwrap_err();
        assert!(matches!(err, AuthError::ValidationError(_)));
        assert!(store.is_empty());
    }
}
