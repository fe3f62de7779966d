//! Redis connection management
//!
//! This module provides Redis connectivity, key namespacing, and health checks.

use crate::config::RedisConfig;
use crate::utils::error::{Result, WardenError};
use redis::Client;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tracing::{debug, info};

/// Redis connection pool
///
/// Every key is namespaced as `{key_prefix}:{key}` so several deployments
/// can share one Redis.
#[derive(Clone)]
pub struct RedisPool {
    /// Reconnecting multiplexed connection
    pub(crate) connection_manager: ConnectionManager,
    /// Configuration
    pub(crate) config: RedisConfig,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &Self::sanitize_url(&self.config.url))
            .field("key_prefix", &self.config.key_prefix)
            .finish()
    }
}

impl RedisPool {
    /// Create a new Redis pool
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        info!("Creating Redis connection pool");
        let sanitized = Self::sanitize_url(&config.url);
        debug!("Redis URL: {}", sanitized);

        let client = Client::open(config.url.as_str()).map_err(WardenError::Redis)?;

        let connection_manager = tokio::time::timeout(
            Duration::from_secs(config.connection_timeout),
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| WardenError::cache(format!("Timed out connecting to {}", sanitized)))?
        .map_err(WardenError::Redis)?;

        info!("Redis connection pool created successfully");
        Ok(Self {
            connection_manager,
            config: config.clone(),
        })
    }

    /// Get a connection handle; handles are cheap clones of one multiplexed connection
    pub(crate) fn connection(&self) -> ConnectionManager {
        self.connection_manager.clone()
    }

    /// Apply the configured namespace to a key
    pub(crate) fn namespaced(&self, key: &str) -> String {
        if self.config.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.config.key_prefix, key)
        }
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        debug!("Performing Redis health check");
        let mut conn = self.connection();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(WardenError::Redis)?;

        debug!("Redis health check passed");
        Ok(())
    }

    /// Sanitize Redis URL for logging (hide password)
    pub(crate) fn sanitize_url(url: &str) -> String {
        if let Ok(parsed) = url::Url::parse(url) {
            let mut sanitized = parsed.clone();
            if sanitized.password().is_some() {
                let _ = sanitized.set_password(Some("***"));
            }
            sanitized.to_string()
        } else {
            "invalid_url".to_string()
        }
    }
}
