//! # castnote_core
//!
//! Core domain logic for castnote: Spotify credentials and their refresh,
//! session materialization, listening history, and episode summaries.

pub mod auth;
pub mod credentials;
pub mod migrate;
pub mod models;
pub mod oauth;
pub mod podcasts;
pub mod session;
pub mod spotify;
pub mod summary;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
