//! Role-Cache
//!
//! Cache-aside store of `user name -> role set`. A missing key means the
//! roles are unknown and must be recomputed from the relational store; an
//! empty set is a confirmed "no roles".
//!
//! Mutations invalidate in two phases: an immediate delete followed by a
//! delayed second delete that clears entries written by readers which raced
//! the first one.

mod scheduler;

pub use scheduler::{InvalidationHandle, InvalidationScheduler};

use crate::config::CacheConfig;
use crate::core::models::RoleSet;
use crate::core::traits::{CacheBackend, Expiry};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cache-aside role store with two-phase invalidation
pub struct RoleCache {
    backend: Arc<dyn CacheBackend>,
    prefix: String,
    delay: Duration,
    scheduler: InvalidationScheduler,
}

impl std::fmt::Debug for RoleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleCache")
            .field("prefix", &self.prefix)
            .field("delay", &self.delay)
            .field("pending", &self.scheduler.pending())
            .finish()
    }
}

impl RoleCache {
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        Self {
            scheduler: InvalidationScheduler::new(backend.clone()),
            backend,
            prefix: config.role_key_prefix.clone(),
            delay: config.invalidation_delay(),
        }
    }

    /// Cache key for a user's roles
    pub fn key(&self, user: &str) -> String {
        format!("{}:{}", self.prefix, user)
    }

    /// Configured delay of the second invalidation phase
    pub fn invalidation_delay(&self) -> Duration {
        self.delay
    }

    /// Cached role set, or `None` on a miss
    ///
    /// A value that does not decode is treated as a miss so that the caller
    /// recomputes and overwrites it.
    pub async fn get_roles(&self, user: &str) -> Result<Option<RoleSet>> {
        let key = self.key(user);
        let Some(raw) = self.backend.get(&key).await? else {
            debug!("Role cache miss for {}", user);
            return Ok(None);
        };

        match serde_json::from_str::<RoleSet>(&raw) {
            Ok(roles) => {
                debug!("Role cache hit for {}: {} roles", user, roles.len());
                Ok(Some(roles))
            }
            Err(e) => {
                warn!("Discarding undecodable role cache entry {}: {}", key, e);
                Ok(None)
            }
        }
    }

    pub async fn set_roles(&self, user: &str, roles: &RoleSet, expiry: Expiry) -> Result<()> {
        let value = serde_json::to_string(roles)?;
        self.backend.set(&self.key(user), &value, expiry).await
    }

    /// Remove the cached entry now
    pub async fn invalidate(&self, user: &str) -> Result<()> {
        debug!("Invalidating cached roles for {}", user);
        self.backend.delete(&self.key(user)).await
    }

    /// Schedule the second invalidation phase after the configured delay
    ///
    /// A newer schedule for the same user supersedes an older one still
    /// pending. Must be called from within a tokio runtime.
    pub fn invalidate_delayed(&self, user: &str) -> InvalidationHandle {
        self.invalidate_after(user, self.delay)
    }

    pub fn invalidate_after(&self, user: &str, delay: Duration) -> InvalidationHandle {
        self.scheduler.schedule(self.key(user), delay)
    }

    /// Immediate invalidation followed by the delayed one
    pub async fn invalidate_twice(&self, user: &str) -> Result<InvalidationHandle> {
        self.invalidate(user).await?;
        Ok(self.invalidate_delayed(user))
    }

    /// Number of delayed invalidations not yet run
    pub fn pending_invalidations(&self) -> usize {
        self.scheduler.pending()
    }
}
