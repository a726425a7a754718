//! Local users and app session tokens.
//!
//! Provides session JWT management and the user store used by the
//! sign-in flow in `castnote_api`.

pub mod jwt;
pub mod queries;
pub mod store;

use thiserror::Error;

pub use store::{MemoryUserStore, PgUserStore, UserStore};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}
