//! Time-bounded in-memory response cache backed by `moka`.
//!
//! An entry is served only while younger than the TTL; at exactly the TTL it
//! is already a miss. Expired entries are evicted by moka's own housekeeping.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Builds the key for one page of a resource, e.g. `photos_page_2_50`.
#[must_use]
pub fn cache_key(kind: &str, page: u32, per_page: u32) -> String {
    format!("{kind}_page_{page}_{per_page}")
}

pub struct ResponseCache<T> {
    entries: Cache<String, Arc<T>>,
    ttl: Duration,
}

impl<T> ResponseCache<T>
where
    T: Send + Sync + 'static,
{
    #[must_use]
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { entries, ttl }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The payload under `key` if present and fresh.
    pub async fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries.get(key).await
    }

    /// Stores `payload` under `key`, replacing any previous entry and
    /// restarting its TTL.
    pub async fn put(&self, key: impl Into<String>, payload: T) -> Arc<T> {
        let payload = Arc::new(payload);
        self.entries.insert(key.into(), payload.clone()).await;
        payload
    }

    /// Number of live entries, after flushing pending evictions.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}
