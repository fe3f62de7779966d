//! In-process cache backend
//!
//! Used when Redis is disabled. Entries and counters live only as long as the
//! process, so machine leases handed out by this backend are unique only
//! within a single process.

use crate::core::traits::{CacheBackend, Expiry};
use crate::utils::error::{Result, WardenError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// DashMap-backed cache with per-entry expiry
#[derive(Debug)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    fn expires_at(&self, expiry: Expiry, now: Instant) -> Option<Instant> {
        match expiry {
            Expiry::Default => Some(now + self.default_ttl),
            Expiry::Never => None,
            Expiry::After(ttl) => Some(now + ttl),
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, expiry: Expiry) -> Result<()> {
        let now = Instant::now();
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: self.expires_at(expiry, now),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let mut entry = self.entries.entry(key.to_string()).or_insert(Entry {
            value: "0".to_string(),
            expires_at: None,
        });
        if entry.is_expired(now) {
            entry.value = "0".to_string();
            entry.expires_at = None;
        }

        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| WardenError::cache(format!("value at {} is not an integer", key)))?;
        let next = current + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_absent_vs_empty() {
        let cache = MemoryCache::default();
        assert_eq!(cache.get("role:alice").await.unwrap(), None);

        cache.set("role:alice", "", Expiry::Never).await.unwrap();
        assert_eq!(cache.get("role:alice").await.unwrap(), Some(String::new()));

        cache.delete("role:alice").await.unwrap();
        assert_eq!(cache.get("role:alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expiry() {
        let cache = MemoryCache::new(Duration::from_millis(20));
        cache.set("a", "1", Expiry::Default).await.unwrap();
        cache
            .set("b", "2", Expiry::After(Duration::from_secs(60)))
            .await
            .unwrap();
        cache.set("c", "3", Expiry::Never).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get("a").await.unwrap(), None);
        assert_eq!(cache.get("b").await.unwrap(), Some("2".to_string()));
        assert_eq!(cache.get("c").await.unwrap(), Some("3".to_string()));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_incr() {
        let cache = MemoryCache::default();
        assert_eq!(cache.incr("machine_id").await.unwrap(), 1);
        assert_eq!(cache.incr("machine_id").await.unwrap(), 2);

        cache.set("text", "abc", Expiry::Never).await.unwrap();
        assert!(cache.incr("text").await.is_err());
    }
}
