//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API response types
//! (which carry `#[serde(rename_all = "camelCase")]`).

use serde::{Deserialize, Serialize};

/// Local user, created on first Spotify sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Spotify account id (`/v1/me` → `id`).
    pub spotify_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// JWT claims embedded in the app session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — local user ID.
    pub sub: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}
