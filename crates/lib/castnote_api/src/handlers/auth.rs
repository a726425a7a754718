//! Spotify sign-in and app session handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use castnote_core::auth::jwt::generate_session_token;
use castnote_core::auth::UserStore;
use castnote_core::credentials::CredentialStore;
use castnote_core::models::credential::{CredentialRecord, SPOTIFY_PROVIDER};
use castnote_core::oauth::PendingSignIn;
use castnote_core::oauth::pkce::{compute_code_challenge, generate_code_verifier, generate_state};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::LogoutResponse;
use crate::services::cookies::{clear_session_cookie, session_cookie};

/// Query parameters Spotify appends to the callback URL.
#[derive(Debug, Deserialize)]
pub struct SpotifyCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user declines.
    pub error: Option<String>,
}

/// `GET /auth/spotify/login` — start a PKCE sign-in and redirect to Spotify.
pub async fn spotify_login_handler(State(state): State<AppState>) -> AppResult<Redirect> {
    if !state.spotify_auth.config().has_client_credentials() {
        return Err(AppError::Unavailable(
            "Spotify client credentials are not configured".into(),
        ));
    }

    let verifier = generate_code_verifier();
    let challenge = compute_code_challenge(&verifier);
    let state_key = generate_state();
    state
        .oauth_state
        .insert(state_key.clone(), PendingSignIn::new(verifier))
        .map_err(|e| {
            warn!("refusing sign-in: {e}");
            AppError::Unavailable(e.to_string())
        })?;

    let url = state.spotify_auth.authorization_url(&state_key, &challenge);
    Ok(Redirect::to(url.as_str()))
}

/// `GET /auth/spotify/callback` — finish sign-in, store the Spotify
/// credential, and set the app session cookie.
pub async fn spotify_callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<SpotifyCallbackParams>,
) -> AppResult<(CookieJar, Redirect)> {
    if let Some(error) = params.error {
        warn!(error = %error, "Spotify sign-in declined");
        return Err(AppError::Validation(format!("Spotify sign-in failed: {error}")));
    }
    let (Some(code), Some(state_key)) = (params.code, params.state) else {
        return Err(AppError::Validation("Missing code or state".into()));
    };
    let pending = state
        .oauth_state
        .take(&state_key)
        .ok_or_else(|| AppError::Validation("Unknown or expired sign-in state".into()))?;

    let grant = state
        .spotify_auth
        .exchange_code(&code, &pending.pkce_verifier)
        .await?;
    let expires_at = grant.expires_at_from("code exchange", Utc::now())?;
    let profile = state.spotify.me(&grant.access_token).await?;

    let user = state
        .users
        .upsert_spotify_user(
            &profile.id,
            profile.display_name.as_deref(),
            profile.email.as_deref(),
        )
        .await?;

    let record = CredentialRecord {
        user_id: user.id.clone(),
        provider: SPOTIFY_PROVIDER.to_string(),
        access_token: grant.access_token,
        refresh_token: grant.refresh_token.unwrap_or_default(),
        expires_at,
    };
    state.credentials.upsert(&record).await?;

    let token = generate_session_token(&user.id, state.config.jwt_secret.as_bytes())?;
    info!(user_id = %user.id, "Spotify sign-in completed");

    Ok((jar.add(session_cookie(&token)), Redirect::to("/")))
}

/// `POST /auth/logout` — clear the session cookie. Stored Spotify
/// credentials are kept.
pub async fn logout_handler(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    (
        jar.add(clear_session_cookie()),
        Json(LogoutResponse { success: true }),
    )
}
