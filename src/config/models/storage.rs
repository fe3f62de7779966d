//! Storage configuration

use super::default_connection_timeout;
use serde::{Deserialize, Serialize};

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connection_timeout: default_connection_timeout(),
        }
    }
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Use Redis as the shared cache tier; when false an in-process cache is used
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Prefix prepended to every key as `{prefix}:{key}`
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Expiry in seconds applied when a write asks for the default
    #[serde(default = "default_ttl")]
    pub default_ttl: u64,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            enabled: true,
            key_prefix: default_key_prefix(),
            default_ttl: default_ttl(),
            connection_timeout: default_connection_timeout(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://data/warden.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "warden".to_string()
}

fn default_ttl() -> u64 {
    30
}

fn default_true() -> bool {
    true
}
