//! Session and profile handlers.

use axum::extract::State;
use axum::{Extension, Json};
use castnote_core::auth::UserStore;
use castnote_core::session::SessionView;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::MeResponse;

/// `GET /api/session` — the caller's Spotify session. Always 200; a missing
/// token is reported through the `error` marker.
pub async fn session_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<SessionView> {
    Json(state.sessions.materialize_session(user.user_id()).await)
}

/// `GET /api/me` — the signed-in user's profile.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<MeResponse>> {
    let user = state
        .users
        .find(user.user_id())
        .await?
        .ok_or_else(|| AppError::NotFound("user".into()))?;
    Ok(Json(MeResponse {
        id: user.id,
        spotify_id: user.spotify_id,
        display_name: user.display_name,
        email: user.email,
    }))
}
