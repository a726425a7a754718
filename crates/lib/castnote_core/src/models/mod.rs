//! Domain models shared by the core modules and the HTTP layer.

pub mod auth;
pub mod credential;
pub mod podcast;
