//! Role-cache and identifier configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role-cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Key prefix for cached role sets, keys are `{prefix}:{user}`
    #[serde(default = "default_role_key_prefix")]
    pub role_key_prefix: String,
    /// Delay before the second invalidation after a role mutation
    #[serde(default = "default_invalidation_delay_ms")]
    pub invalidation_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            role_key_prefix: default_role_key_prefix(),
            invalidation_delay_ms: default_invalidation_delay_ms(),
        }
    }
}

impl CacheConfig {
    pub fn invalidation_delay(&self) -> Duration {
        Duration::from_millis(self.invalidation_delay_ms)
    }
}

/// Identifier allocation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdConfig {
    /// Shared counter incremented once per process to obtain a machine lease
    #[serde(default = "default_machine_lease_key")]
    pub machine_lease_key: String,
    /// Allocator epoch in unix milliseconds
    #[serde(default = "default_epoch")]
    pub epoch: i64,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            machine_lease_key: default_machine_lease_key(),
            epoch: default_epoch(),
        }
    }
}

fn default_role_key_prefix() -> String {
    "role".to_string()
}

fn default_invalidation_delay_ms() -> u64 {
    200
}

fn default_machine_lease_key() -> String {
    "machine_id".to_string()
}

// 2014-09-01T00:00:00Z
fn default_epoch() -> i64 {
    1_409_529_600_000
}
