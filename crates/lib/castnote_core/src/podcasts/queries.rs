//! Episode and summary queries.

use sqlx::PgPool;

use super::PodcastError;
use crate::models::podcast::{Episode, ParsedSummary, SummaryRecord};
use crate::uuid::uuidv7;

/// Insert an episode, or refresh its metadata if it is already stored.
pub async fn upsert_episode(pool: &PgPool, episode: &Episode) -> Result<(), PodcastError> {
    sqlx::query(
        r#"
        INSERT INTO podcast_episodes
            (id, title, description, duration_ms, release_date, spotify_url, image_url, show_id, show_name)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id)
        DO UPDATE SET title = EXCLUDED.title,
                      description = EXCLUDED.description,
                      duration_ms = EXCLUDED.duration_ms,
                      release_date = EXCLUDED.release_date,
                      spotify_url = EXCLUDED.spotify_url,
                      image_url = EXCLUDED.image_url,
                      show_id = EXCLUDED.show_id,
                      show_name = EXCLUDED.show_name,
                      updated_at = now()
        "#,
    )
    .bind(&episode.id)
    .bind(&episode.name)
    .bind(&episode.description)
    .bind(episode.duration_ms)
    .bind(episode.release_day())
    .bind(&episode.external_urls.spotify)
    .bind(episode.image_url())
    .bind(&episode.show.id)
    .bind(&episode.show.name)
    .execute(pool)
    .await?;
    Ok(())
}

/// Store a summary for an episode. `content` is kept as JSON text.
pub async fn insert_summary(
    pool: &PgPool,
    episode_id: &str,
    summary: &ParsedSummary,
) -> Result<SummaryRecord, PodcastError> {
    let content = serde_json::to_string(summary)?;
    let record = sqlx::query_as::<_, SummaryRecord>(
        r#"
        INSERT INTO summaries (id, episode_id, content)
        VALUES ($1, $2, $3)
        RETURNING id::text AS id, episode_id, content, generated_at
        "#,
    )
    .bind(uuidv7())
    .bind(episode_id)
    .bind(&content)
    .fetch_one(pool)
    .await?;
    Ok(record)
}

/// All summaries for the given episodes, newest first.
pub async fn summaries_for_episodes(
    pool: &PgPool,
    episode_ids: &[String],
) -> Result<Vec<SummaryRecord>, PodcastError> {
    if episode_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, SummaryRecord>(
        r#"
        SELECT id::text AS id, episode_id, content, generated_at
        FROM summaries
        WHERE episode_id = ANY($1)
        ORDER BY generated_at DESC
        "#,
    )
    .bind(episode_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
