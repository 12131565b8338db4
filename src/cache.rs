//! Short-lived notification-list cache.
//!
//! Read operations are served from here between polls so rapid UI
//! interaction does not refire the same request. The reconciliation logic in
//! `service` is written against the `ListStore` trait, not the concrete
//! store, so the optimistic mark-read patching stays independent of any
//! particular caching backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::models::Notification;

/// Cache key helpers. One keyspace per endpoint, scoped by user (and ticket
/// for histories).
pub mod keys {
    pub fn feed(user_id: &str) -> String {
        format!("feed:{user_id}")
    }

    pub fn user_notifications(user_id: &str) -> String {
        format!("user_notifications:{user_id}")
    }

    pub fn history(ticket_id: &str, user_id: &str) -> String {
        format!("history:{ticket_id}:{user_id}")
    }
}

/// Repository interface the reconciler depends on: read a cached list,
/// replace it, rewrite entries in place, or drop it.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<Notification>>;

    async fn put(&self, key: &str, list: &[Notification], ttl: Duration);

    /// Apply `patch` to the cached list if one is present, preserving its
    /// remaining TTL. Returns `true` when an entry was patched.
    async fn patch(
        &self,
        key: &str,
        patch: &(dyn for<'a> Fn(&'a mut Vec<Notification>) + Send + Sync),
    ) -> bool;

    async fn invalidate(&self, key: &str);
}

/// Entry stored in the map with an expiry timestamp.
#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-memory `ListStore`: a DashMap of JSON-serialized lists with per-entry
/// TTL, checked on read and evicted lazily.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all expired entries. The poller calls this once per tick to
    /// bound memory usage.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<Vec<Notification>> {
        let entry = self.entries.get(key)?;
        if Instant::now() >= entry.expires_at {
            // expired — drop the ref before removing
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        serde_json::from_str(&entry.value).ok()
    }

    async fn put(&self, key: &str, list: &[Notification], ttl: Duration) {
        let json = match serde_json::to_string(list) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache entry");
                return;
            }
        };
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: json,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn patch(
        &self,
        key: &str,
        patch: &(dyn for<'a> Fn(&'a mut Vec<Notification>) + Send + Sync),
    ) -> bool {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return false;
        };
        if Instant::now() >= entry.expires_at {
            drop(entry);
            self.entries.remove(key);
            return false;
        }
        let Ok(mut list) = serde_json::from_str::<Vec<Notification>>(&entry.value) else {
            return false;
        };
        patch(&mut list);
        match serde_json::to_string(&list) {
            Ok(json) => {
                entry.value = json;
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to reserialize patched entry");
                false
            }
        }
    }

    async fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}

// ── Tests ─────────────────────────────────────────────────────
