//! Session cookie helpers.

use axum_extra::extract::cookie::{Cookie, SameSite};
use castnote_core::auth::jwt::SESSION_EXPIRY_SECS;
use time::Duration;

/// Cookie carrying the app session JWT.
pub const SESSION_COOKIE: &str = "castnote_session";

fn build(value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE.to_string(), value))
        .http_only(true)
        .secure(false) // TODO: set true once the app is only served over HTTPS
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(max_age)
        .build()
}

/// httpOnly cookie holding a session token, valid as long as the token.
pub fn session_cookie(token: &str) -> Cookie<'static> {
    build(token.to_string(), Duration::seconds(SESSION_EXPIRY_SECS))
}

/// Expired cookie that clears the session.
pub fn clear_session_cookie() -> Cookie<'static> {
    build(String::new(), Duration::ZERO)
}
