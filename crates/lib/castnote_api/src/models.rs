//! Request and response bodies for the HTTP API.

use castnote_core::models::podcast::{Episode, SummaryRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub version: String,
    pub db_connected: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: String,
    pub spotify_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// A recently played episode with the summaries stored for it.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEpisode {
    pub episode: Episode,
    pub played_at: DateTime<Utc>,
    pub summaries: Vec<SummaryRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentPodcastsResponse {
    pub episodes: Vec<RecentEpisode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentPodcastResponse {
    pub episode: Option<Episode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: SummaryRecord,
}
