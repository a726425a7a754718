//! Podcast episode and summary persistence.

pub mod queries;

use thiserror::Error;

/// Podcast store errors.
#[derive(Debug, Error)]
pub enum PodcastError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
