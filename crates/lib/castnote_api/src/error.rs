//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use castnote_core::auth::AuthError;
use castnote_core::credentials::CredentialError;
use castnote_core::oauth::OAuthError;
use castnote_core::podcasts::PodcastError;
use castnote_core::session::SessionMarker;
use castnote_core::spotify::SpotifyError;
use castnote_core::summary::SummaryError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The app session is valid but carries no usable Spotify token.
    #[error("No Spotify session: {0:?}")]
    NoSpotifySession(SessionMarker),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::NoSpotifySession(SessionMarker::Unauthenticated) => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "No Spotify account is connected",
            ),
            AppError::NoSpotifySession(SessionMarker::ReauthRequired) => (
                StatusCode::UNAUTHORIZED,
                "reauth-required",
                "Spotify sign-in has expired, sign in again",
            ),
            AppError::Upstream(m) => {
                error!("upstream error: {m}");
                (StatusCode::BAD_GATEWAY, "upstream_error", "Upstream service failed")
            }
            AppError::Unavailable(m) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", m.as_str())
            }
            AppError::Internal(m) => {
                error!("internal error: {m}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::TokenError(msg) => AppError::Unauthorized(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::NotFound { .. } => AppError::NotFound(e.to_string()),
            CredentialError::Encryption(msg) => AppError::Internal(msg),
            CredentialError::Db(e) => AppError::from(e),
        }
    }
}

impl From<OAuthError> for AppError {
    fn from(e: OAuthError) -> Self {
        match e {
            // A rejected code exchange means a bad or replayed code.
            OAuthError::Rejected { .. } => AppError::Validation(e.to_string()),
            OAuthError::Config(msg) => AppError::Unavailable(msg),
            OAuthError::Timeout { .. }
            | OAuthError::Transport { .. }
            | OAuthError::Malformed { .. } => AppError::Upstream(e.to_string()),
        }
    }
}

impl From<SpotifyError> for AppError {
    fn from(e: SpotifyError) -> Self {
        match e {
            SpotifyError::Unauthorized => {
                AppError::NoSpotifySession(SessionMarker::ReauthRequired)
            }
            SpotifyError::NotFound(what) => AppError::NotFound(what),
            SpotifyError::Http { .. }
            | SpotifyError::Transport(_)
            | SpotifyError::Malformed(_) => AppError::Upstream(e.to_string()),
        }
    }
}

impl From<SummaryError> for AppError {
    fn from(e: SummaryError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<PodcastError> for AppError {
    fn from(e: PodcastError) -> Self {
        match e {
            PodcastError::Db(e) => AppError::from(e),
            PodcastError::Serialization(e) => AppError::Internal(e.to_string()),
        }
    }
}
