//! Session cache holding the live refresh token of each user.
//!
//! Uses a `moka` async cache with a per-entry expiry policy, so every `put`
//! carries its own TTL. Writing a key again replaces the previous session and
//! restarts its clock.

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};

use crate::errors::CacheError;

/// Key/value store with per-key time-to-live.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Returns the live value for `key`.
    ///
    /// # Errors
    /// `CacheError::NotFound` on a miss, `CacheError::Backend` if the cache
    /// itself could not be reached.
    async fn get(&self, key: &str) -> Result<String, CacheError>;

    /// Drops the entry for `key`; a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Clone)]
struct SessionEntry {
    value: String,
    ttl: Duration,
}

struct SessionExpiry;

impl Expiry<String, SessionEntry> for SessionExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &SessionEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &SessionEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process session cache.
#[derive(Clone)]
pub struct MokaSessionCache {
    cache: Cache<String, SessionEntry>,
}

impl MokaSessionCache {
    /// Create a cache holding at most `max_entries` sessions.
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(SessionExpiry)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl SessionCache for MokaSessionCache {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.cache
            .insert(
                key.to_string(),
                SessionEntry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String, CacheError> {
        self.cache
            .get(key)
            .await
            .map(|entry| entry.value)
            .ok_or(CacheError::NotFound)
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = MokaSessionCache::new(100);
        cache.put("alice", "token-1", MINUTE).await.unwrap();

        assert_eq!(cache.get("alice").await.unwrap(), "token-1");
        assert!(matches!(cache.get("bob").await, Err(CacheError::NotFound)));
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let cache = MokaSessionCache::new(100);
        cache.put("alice", "token-1", MINUTE).await.unwrap();
        cache.put("alice", "token-2", MINUTE).await.unwrap();

        assert_eq!(cache.get("alice").await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MokaSessionCache::new(100);
        cache
            .put("alice", "token-1", Duration::from_millis(50))
            .await
            .unwrap();
        cache.put("bob", "token-2", MINUTE).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(matches!(cache.get("alice").await, Err(CacheError::NotFound)));
        assert_eq!(cache.get("bob").await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = MokaSessionCache::new(100);
        cache.put("alice", "token-1", MINUTE).await.unwrap();

        cache.remove("alice").await.unwrap();
        cache.remove("never-stored").await.unwrap();

        assert!(matches!(cache.get("alice").await, Err(CacheError::NotFound)));
    }
}
