//! Request handlers.

pub mod auth;
pub mod health;
pub mod podcasts;
pub mod session;

use castnote_core::session::SessionView;

use crate::error::{AppError, AppResult};

/// The Spotify access token of a materialized session, or the 401 carrying
/// the session's marker.
pub(crate) fn spotify_token(view: &SessionView) -> AppResult<&str> {
    match (view.access_token(), view.error()) {
        (Some(token), _) => Ok(token),
        (None, Some(marker)) => Err(AppError::NoSpotifySession(marker)),
        (None, None) => Err(AppError::Internal("session without token or marker".into())),
    }
}
