//! Spotify Web API client.
//!
//! Read-only calls made with a user's access token: profile, listening
//! history, and episode lookup.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::podcast::{Episode, PlayedEpisode};

/// Default Web API base.
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com";

const MAX_RECENT_LIMIT: u32 = 50;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the Spotify Web API.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Spotify rejected the access token")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Spotify returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Spotify request failed: {0}")]
    Transport(String),

    #[error("Unexpected Spotify response: {0}")]
    Malformed(String),
}

/// The signed-in user's Spotify profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpotifyProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct RecentlyPlayedPage {
    items: Vec<RecentlyPlayedItem>,
}

#[derive(Deserialize)]
struct RecentlyPlayedItem {
    track: serde_json::Value,
    played_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
struct CurrentlyPlaying {
    #[serde(default)]
    item: Option<serde_json::Value>,
}

/// Spotify Web API client. Cheap to clone; share one per process.
#[derive(Debug, Clone)]
pub struct SpotifyApi {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for SpotifyApi {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl SpotifyApi {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: SPOTIFY_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the client at another host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `GET /v1/me`
    pub async fn me(&self, access_token: &str) -> Result<SpotifyProfile, SpotifyError> {
        self.get_json(access_token, &["v1", "me"], &[]).await
    }

    /// Recently played podcast episodes, newest first.
    ///
    /// `limit` is clamped to `1..=50`. Music tracks are dropped, so fewer than
    /// `limit` items may come back.
    pub async fn recently_played_episodes(
        &self,
        access_token: &str,
        limit: u32,
    ) -> Result<Vec<PlayedEpisode>, SpotifyError> {
        let limit = limit.clamp(1, MAX_RECENT_LIMIT).to_string();
        let page: RecentlyPlayedPage = self
            .get_json(
                access_token,
                &["v1", "me", "player", "recently-played"],
                &[("limit", limit.as_str())],
            )
            .await?;

        let episodes = page
            .items
            .into_iter()
            .filter_map(|item| {
                let episode = episode_from_value(item.track)?;
                Some(PlayedEpisode {
                    episode,
                    played_at: item.played_at,
                })
            })
            .collect();
        Ok(episodes)
    }

    /// `GET /v1/episodes/{id}`. Ids that are not base62 are reported as not
    /// found without a request.
    pub async fn episode(&self, access_token: &str, id: &str) -> Result<Episode, SpotifyError> {
        if !is_spotify_id(id) {
            return Err(SpotifyError::NotFound(format!("episode {id}")));
        }
        let segments = ["v1", "episodes", id];
        self.get_json(access_token, &segments, &[]).await.map_err(|e| match e {
            SpotifyError::NotFound(_) => SpotifyError::NotFound(format!("episode {id}")),
            other => other,
        })
    }

    /// The episode playing right now, if the player is on a podcast.
    pub async fn currently_playing_episode(
        &self,
        access_token: &str,
    ) -> Result<Option<Episode>, SpotifyError> {
        let resp = self
            .send(access_token, &["v1", "me", "player", "currently-playing"], &[])
            .await?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body: CurrentlyPlaying = read_json(resp).await?;
        Ok(body.item.and_then(episode_from_value))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        access_token: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, SpotifyError> {
        let resp = self.send(access_token, segments, query).await?;
        read_json(resp).await
    }

    async fn send(
        &self,
        access_token: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, SpotifyError> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SpotifyError::Transport(e.to_string()))?;

        let status = resp.status();
        match status {
            s if s.is_success() => Ok(resp),
            StatusCode::UNAUTHORIZED => Err(SpotifyError::Unauthorized),
            StatusCode::NOT_FOUND => Err(SpotifyError::NotFound(path)),
            _ => {
                let body = resp.text().await.unwrap_or_default();
                debug!(path = %path, status = %status, "Spotify request rejected");
                Err(SpotifyError::Http {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

impl SpotifyApi {
    /// Base URL with each segment appended percent-encoded, so a `/` inside a
    /// segment cannot reach another endpoint.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SpotifyError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SpotifyError::Transport(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| SpotifyError::Transport("base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Spotify ids are base62.
fn is_spotify_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, SpotifyError> {
    resp.json::<T>()
        .await
        .map_err(|e| SpotifyError::Malformed(e.to_string()))
}

/// Parse a history/player item as an episode, skipping tracks and items
/// Spotify returns with missing fields.
fn episode_from_value(value: serde_json::Value) -> Option<Episode> {
    if value.get("type").and_then(|t| t.as_str()) != Some("episode") {
        return None;
    }
    serde_json::from_value(value)
        .inspect_err(|e| warn!("skipping unparseable episode: {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> SpotifyApi {
        SpotifyApi::default().with_base_url(server.uri())
    }

    fn episode(id: &str) -> serde_json::Value {
        serde_json::json!({
            "type": "episode",
            "id": id,
            "name": format!("Episode {id}"),
            "description": "desc",
            "duration_ms": 60_000,
            "release_date": "2024-05-01",
            "images": [],
            "external_urls": {"spotify": format!("https://open.spotify.com/episode/{id}")},
            "show": {"id": "show1", "name": "Show"}
        })
    }

    #[tokio::test]
    async fn recently_played_keeps_only_episodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player/recently-played"))
            .and(query_param("limit", "50"))
            .and(header("authorization", "Bearer A1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"track": episode("e1"), "played_at": "2024-05-02T10:00:00Z"},
                    {"track": {"type": "track", "id": "t1", "name": "Song"},
                     "played_at": "2024-05-02T09:00:00Z"},
                    {"track": {"type": "episode", "id": "broken"},
                     "played_at": "2024-05-02T08:00:00Z"},
                    {"track": episode("e2"), "played_at": "2024-05-01T10:00:00Z"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let played = api_for(&server)
            .recently_played_episodes("A1", 500)
            .await
            .unwrap();

        let ids: Vec<_> = played.iter().map(|p| p.episode.id.as_str()).collect();
        assert_eq!(ids, ["e1", "e2"]);
    }

    #[tokio::test]
    async fn episode_maps_not_found_and_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/episodes/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/episodes/e1"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let api = api_for(&server);

        let err = api.episode("A1", "missing").await.unwrap_err();
        assert!(matches!(err, SpotifyError::NotFound(ref what) if what == "episode missing"));

        let err = api.episode("stale", "e1").await.unwrap_err();
        assert!(matches!(err, SpotifyError::Unauthorized));
    }

    #[tokio::test]
    async fn episode_id_cannot_escape_episodes_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x"})))
            .expect(0)
            .mount(&server)
            .await;
        let api = api_for(&server);

        for id in ["../me", "..", "e1/../../me", "", "e1?market=JP"] {
            let err = api.episode("A1", id).await.unwrap_err();
            assert!(matches!(err, SpotifyError::NotFound(_)), "{id}: {err:?}");
        }
    }

    #[test]
    fn endpoint_percent_encodes_segments() {
        let api = SpotifyApi::default().with_base_url("http://127.0.0.1:9/proxy/");
        let url = api.endpoint(&["v1", "episodes", "a/b"]).unwrap();
        assert_eq!(url.path(), "/proxy/v1/episodes/a%2Fb");

        let url = SpotifyApi::default().endpoint(&["v1", "me"]).unwrap();
        assert_eq!(url.as_str(), "https://api.spotify.com/v1/me");
    }

    #[tokio::test]
    async fn episode_parses_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/episodes/e1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(episode("e1")))
            .mount(&server)
            .await;

        let ep = api_for(&server).episode("A1", "e1").await.unwrap();
        assert_eq!(ep.name, "Episode e1");
        assert_eq!(ep.show.id, "show1");
    }

    #[tokio::test]
    async fn server_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = api_for(&server).me("A1").await.unwrap_err();
        assert!(matches!(err, SpotifyError::Http { status: 503, ref body } if body == "down"));
    }

    #[tokio::test]
    async fn me_reads_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "spotify-user",
                "display_name": "Listener",
                "country": "JP"
            })))
            .mount(&server)
            .await;

        let me = api_for(&server).me("A1").await.unwrap();
        assert_eq!(me.id, "spotify-user");
        assert_eq!(me.display_name.as_deref(), Some("Listener"));
        assert_eq!(me.email, None);
    }

    #[tokio::test]
    async fn currently_playing_handles_idle_and_music() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player/currently-playing"))
            .and(header("authorization", "Bearer idle"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player/currently-playing"))
            .and(header("authorization", "Bearer music"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "item": {"type": "track", "id": "t1"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/me/player/currently-playing"))
            .and(header("authorization", "Bearer podcast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "item": episode("e9")
            })))
            .mount(&server)
            .await;
        let api = api_for(&server);

        assert_eq!(api.currently_playing_episode("idle").await.unwrap(), None);
        assert_eq!(api.currently_playing_episode("music").await.unwrap(), None);
        let ep = api.currently_playing_episode("podcast").await.unwrap().unwrap();
        assert_eq!(ep.id, "e9");
    }
}
