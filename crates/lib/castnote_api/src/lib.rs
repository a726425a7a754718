//! # castnote_api
//!
//! HTTP API library for castnote.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use castnote_core::auth::{PgUserStore, UserStore};
use castnote_core::credentials::{CredentialStore, PgCredentialStore};
use castnote_core::oauth::{OAuthError, OAuthStateStore, SpotifyAuthClient};
use castnote_core::session::SessionMaterializer;
use castnote_core::spotify::SpotifyApi;
use castnote_core::summary::{GeminiSummarizer, SummaryGenerator};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, podcasts, session};

/// Shared application state passed to all handlers.
///
/// Every client in here is built once at startup and shared by reference.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Local users.
    pub users: Arc<dyn UserStore>,
    /// Spotify credential storage.
    pub credentials: Arc<dyn CredentialStore>,
    /// Turns a user id into a session with a valid Spotify token.
    pub sessions: Arc<SessionMaterializer>,
    /// Spotify accounts service (authorize URL, code exchange).
    pub spotify_auth: Arc<SpotifyAuthClient>,
    /// Spotify Web API.
    pub spotify: SpotifyApi,
    pub summarizer: Arc<dyn SummaryGenerator>,
    /// Pending sign-ins between login redirect and callback.
    pub oauth_state: Arc<OAuthStateStore>,
}

impl AppState {
    /// Production wiring: Postgres user and credential stores, Spotify and Gemini
    /// clients sharing one HTTP connection pool.
    pub fn new(pool: PgPool, config: ApiConfig) -> Result<Self, OAuthError> {
        let http = reqwest::Client::new();

        let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(
            pool.clone(),
            config.token_encryption_key.clone(),
        ));
        let spotify_auth = Arc::new(
            SpotifyAuthClient::new(config.spotify_oauth()?).with_http_client(http.clone()),
        );
        let sessions = Arc::new(SessionMaterializer::new(
            Arc::clone(&credentials),
            spotify_auth.clone(),
        ));
        let summarizer = Arc::new(GeminiSummarizer::new(
            http.clone(),
            config.gemini_api_key.clone(),
        ));

        Ok(Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            pool,
            config,
            credentials,
            sessions,
            spotify_auth,
            spotify: SpotifyApi::new(http),
            summarizer,
            oauth_state: Arc::new(OAuthStateStore::new()),
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `castnote_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    castnote_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(routes::GET_AUTH_SPOTIFY_LOGIN, get(auth::spotify_login_handler))
        .route(
            routes::GET_AUTH_SPOTIFY_CALLBACK,
            get(auth::spotify_callback_handler),
        )
        .route(routes::POST_AUTH_LOGOUT, post(auth::logout_handler));

    // Protected routes (require an app session)
    let protected = Router::new()
        .route(routes::GET_API_SESSION, get(session::session_handler))
        .route(routes::GET_API_ME, get(session::me_handler))
        .route(
            routes::GET_API_PODCASTS_RECENT,
            get(podcasts::recent_podcasts_handler),
        )
        .route(
            routes::GET_API_PODCASTS_CURRENT,
            get(podcasts::current_podcast_handler),
        )
        .route(
            routes::POST_API_PODCASTS_ID_SUMMARY,
            post(podcasts::create_summary_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
