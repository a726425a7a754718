//! Pending sign-in state, kept between the authorize redirect and the callback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;
use tokio::task::JoinHandle;

/// TTL for pending sign-in entries (10 minutes).
const STATE_TTL: Duration = Duration::from_secs(600);

/// Default cap on pending sign-ins held at once.
pub const MAX_PENDING_SIGN_INS: usize = 10_000;

/// How often the cleanup task sweeps expired entries.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// What the callback needs to finish a sign-in.
pub struct PendingSignIn {
    pub pkce_verifier: String,
    pub created_at: Instant,
}

impl PendingSignIn {
    pub fn new(pkce_verifier: String) -> Self {
        Self {
            pkce_verifier,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > STATE_TTL
    }
}

/// Returned by [`OAuthStateStore::insert`] when the store is full.
#[derive(Debug, Error)]
#[error("Too many pending sign-ins (limit {limit})")]
pub struct PendingSignInsFull {
    pub limit: usize,
}

/// In-memory store for pending sign-ins, keyed by the `state` parameter.
///
/// Bounded: once `capacity` live entries are held, new sign-ins are refused
/// until entries are taken or expire.
pub struct OAuthStateStore {
    states: DashMap<String, PendingSignIn>,
    capacity: usize,
}

impl Default for OAuthStateStore {
    fn default() -> Self {
        Self::with_capacity(MAX_PENDING_SIGN_INS)
    }
}

impl OAuthStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: DashMap::new(),
            capacity,
        }
    }

    pub fn insert(
        &self,
        state_key: String,
        pending: PendingSignIn,
    ) -> Result<(), PendingSignInsFull> {
        if self.states.len() >= self.capacity {
            self.cleanup();
            // Soft limit: concurrent inserts may overshoot by a few entries.
            if self.states.len() >= self.capacity {
                return Err(PendingSignInsFull {
                    limit: self.capacity,
                });
            }
        }
        self.states.insert(state_key, pending);
        Ok(())
    }

    /// Remove and return a pending entry. `None` if unknown or expired.
    pub fn take(&self, state_key: &str) -> Option<PendingSignIn> {
        let (_, pending) = self.states.remove(state_key)?;
        if pending.is_expired() {
            return None;
        }
        Some(pending)
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        self.states.retain(|_, v| !v.is_expired());
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Spawn a periodic cleanup task. Abort the handle at shutdown.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                store.cleanup();
            }
        })
    }
}
