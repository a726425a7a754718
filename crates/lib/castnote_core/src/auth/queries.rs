//! User queries.

use sqlx::PgPool;

use super::AuthError;
use crate::models::auth::User;

/// Insert or update the local user for a Spotify account, returning it.
pub async fn upsert_spotify_user(
    pool: &PgPool,
    spotify_id: &str,
    display_name: Option<&str>,
    email: Option<&str>,
) -> Result<User, AuthError> {
    let (id,) = sqlx::query_as::<_, (String,)>(
        r#"
        INSERT INTO users (spotify_id, display_name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (spotify_id)
        DO UPDATE SET display_name = EXCLUDED.display_name,
                      email = EXCLUDED.email,
                      updated_at = now()
        RETURNING id::text
        "#,
    )
    .bind(spotify_id)
    .bind(display_name)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(User {
        id,
        spotify_id: spotify_id.to_string(),
        display_name: display_name.map(str::to_string),
        email: email.map(str::to_string),
    })
}

/// Fetch a user by ID.
pub async fn get_user_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, (String, Option<String>, Option<String>)>(
        "SELECT spotify_id, display_name, email FROM users WHERE id = $1::uuid",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(spotify_id, display_name, email)| User {
        id: user_id.to_string(),
        spotify_id,
        display_name,
        email,
    }))
}
