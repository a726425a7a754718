//! Podcast episode and summary models.
//!
//! `Episode` mirrors the Spotify episode object closely enough to deserialize
//! it directly; everything else is castnote's own shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Cover image attached to an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// External links for an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

/// The show an episode belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRef {
    pub id: String,
    pub name: String,
}

/// A Spotify podcast episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_ms: i64,
    /// `YYYY-MM-DD`, `YYYY-MM` or `YYYY` depending on Spotify's precision.
    pub release_date: String,
    pub images: Vec<Image>,
    pub external_urls: ExternalUrls,
    pub show: ShowRef,
}

impl Episode {
    /// Release date as a calendar date, padding month/day precision to the 1st.
    pub fn release_day(&self) -> Option<NaiveDate> {
        let padded = match self.release_date.len() {
            4 => format!("{}-01-01", self.release_date),
            7 => format!("{}-01", self.release_date),
            _ => self.release_date.clone(),
        };
        NaiveDate::parse_from_str(&padded, "%Y-%m-%d").ok()
    }

    /// URL of the first (largest) cover image.
    pub fn image_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }
}

/// An episode from the listening history together with when it was played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedEpisode {
    #[serde(flatten)]
    pub episode: Episode,
    pub played_at: DateTime<Utc>,
}

/// Stored summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub id: String,
    pub episode_id: String,
    /// JSON-encoded [`ParsedSummary`].
    pub content: String,
    pub generated_at: DateTime<Utc>,
}

/// Structured form of a generated summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSummary {
    pub overview: String,
    pub key_points: Vec<String>,
    pub details: String,
}
