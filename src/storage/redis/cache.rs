//! Key/value cache operations

use super::pool::RedisPool;
use crate::core::traits::{CacheBackend, Expiry};
use crate::utils::error::{Result, WardenError};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;

/// Resolve a requested expiry against the configured default; `None` means no expiry
pub(crate) fn resolve_expiry(expiry: Expiry, default_ttl: Duration) -> Option<Duration> {
    match expiry {
        Expiry::Default => Some(default_ttl),
        Expiry::Never => None,
        Expiry::After(ttl) => Some(ttl),
    }
}

impl RedisPool {
    /// Get a value from cache
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection();
        let value: Option<String> = conn
            .get(self.namespaced(key))
            .await
            .map_err(WardenError::Redis)?;
        Ok(value)
    }

    /// Set a key-value pair; a plain SET also clears any previous TTL
    pub async fn set(&self, key: &str, value: &str, expiry: Expiry) -> Result<()> {
        let key = self.namespaced(key);
        let mut conn = self.connection();

        let default_ttl = Duration::from_secs(self.config.default_ttl);
        match resolve_expiry(expiry, default_ttl) {
            Some(ttl) => {
                let millis = (ttl.as_millis() as u64).max(1);
                let _: () = conn
                    .pset_ex(key, value, millis)
                    .await
                    .map_err(WardenError::Redis)?;
            }
            None => {
                let _: () = conn.set(key, value).await.map_err(WardenError::Redis)?;
            }
        }
        Ok(())
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection();
        let _: () = conn
            .del(self.namespaced(key))
            .await
            .map_err(WardenError::Redis)?;
        Ok(())
    }
}

#[async_trait]
impl CacheBackend for RedisPool {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        RedisPool::get(self, key).await
    }

    async fn set(&self, key: &str, value: &str, expiry: Expiry) -> Result<()> {
        RedisPool::set(self, key, value, expiry).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        RedisPool::delete(self, key).await
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.increment(key, 1).await
    }

    async fn health_check(&self) -> Result<()> {
        RedisPool::health_check(self).await
    }
}
