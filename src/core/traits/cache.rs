//! Shared cache backend trait

use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Expiry requested for a cache write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// The backend's configured default
    #[default]
    Default,
    /// Keep until explicitly deleted
    Never,
    /// Expire after the given duration
    After(Duration),
}

/// String key/value cache with atomic counters
///
/// `get` distinguishes a missing key (`None`) from any stored value,
/// including an empty string.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, expiry: Expiry) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomically increment the counter at `key`, returning the new value
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Round trip to the backend
    async fn health_check(&self) -> Result<()>;
}
