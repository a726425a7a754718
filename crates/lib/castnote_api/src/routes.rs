//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";
pub const GET_API_SESSION: &str = "/api/session";
pub const GET_API_ME: &str = "/api/me";
pub const GET_API_PODCASTS_RECENT: &str = "/api/podcasts/recent";
pub const GET_API_PODCASTS_CURRENT: &str = "/api/podcasts/current";
pub const POST_API_PODCASTS_ID_SUMMARY: &str = "/api/podcasts/{id}/summary";
pub const GET_AUTH_SPOTIFY_LOGIN: &str = "/auth/spotify/login";
pub const GET_AUTH_SPOTIFY_CALLBACK: &str = "/auth/spotify/callback";
pub const POST_AUTH_LOGOUT: &str = "/auth/logout";
