//! Redis atomic operations

use super::pool::RedisPool;
use crate::utils::error::{Result, WardenError};
use redis::AsyncCommands;

impl RedisPool {
    /// Increment key value by delta
    pub async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        let mut conn = self.connection();
        let new_value: i64 = conn
            .incr(self.namespaced(key), delta)
            .await
            .map_err(WardenError::Redis)?;
        Ok(new_value)
    }
}
