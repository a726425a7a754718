//! Podcast history and summary handlers.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use castnote_core::models::podcast::SummaryRecord;
use castnote_core::podcasts::queries::{insert_summary, summaries_for_episodes, upsert_episode};
use castnote_core::summary::{SummaryGenerator, parse_summary};
use serde::Deserialize;
use tracing::info;

use super::spotify_token;
use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CurrentPodcastResponse, RecentEpisode, RecentPodcastsResponse, SummaryResponse};

const DEFAULT_RECENT_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<u32>,
}

/// `GET /api/podcasts/recent` — recently played episodes with their stored
/// summaries.
pub async fn recent_podcasts_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<RecentParams>,
) -> AppResult<Json<RecentPodcastsResponse>> {
    let session = state.sessions.materialize_session(user.user_id()).await;
    let token = spotify_token(&session)?;

    let played = state
        .spotify
        .recently_played_episodes(token, params.limit.unwrap_or(DEFAULT_RECENT_LIMIT))
        .await?;

    let mut ids: Vec<String> = played.iter().map(|p| p.episode.id.clone()).collect();
    ids.sort();
    ids.dedup();

    let mut by_episode: HashMap<String, Vec<SummaryRecord>> = HashMap::new();
    for summary in summaries_for_episodes(&state.pool, &ids).await? {
        by_episode
            .entry(summary.episode_id.clone())
            .or_default()
            .push(summary);
    }

    let episodes = played
        .into_iter()
        .map(|p| RecentEpisode {
            summaries: by_episode.get(&p.episode.id).cloned().unwrap_or_default(),
            played_at: p.played_at,
            episode: p.episode,
        })
        .collect();

    Ok(Json(RecentPodcastsResponse { episodes }))
}

/// `GET /api/podcasts/current` — the episode playing now, if any.
pub async fn current_podcast_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<CurrentPodcastResponse>> {
    let session = state.sessions.materialize_session(user.user_id()).await;
    let token = spotify_token(&session)?;
    let episode = state.spotify.currently_playing_episode(token).await?;
    Ok(Json(CurrentPodcastResponse { episode }))
}

/// `POST /api/podcasts/{id}/summary` — summarize an episode's description and
/// store the result.
pub async fn create_summary_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<SummaryResponse>> {
    let session = state.sessions.materialize_session(user.user_id()).await;
    let token = spotify_token(&session)?;

    let episode = state.spotify.episode(token, &id).await?;
    let text = state.summarizer.generate(&episode.description).await?;
    let parsed = parse_summary(&text);

    upsert_episode(&state.pool, &episode).await?;
    let summary = insert_summary(&state.pool, &episode.id, &parsed).await?;
    info!(user_id = %user.user_id(), episode_id = %episode.id, "summary created");

    Ok(Json(SummaryResponse { summary }))
}
