//! Redis storage implementation
//!
//! This module provides the shared cache tier: role-set entries and the
//! machine-lease counter.
//!
//! ## Module Structure
//!
//! - `pool` - Connection management and health checks
//! - `cache` - Key/value operations and the `CacheBackend` implementation
//! - `atomic` - Atomic counters
//! - `tests` - Module tests

mod atomic;
mod cache;
mod pool;
#[cfg(test)]
mod tests;

pub use pool::RedisPool;
