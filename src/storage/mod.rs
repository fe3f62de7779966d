//! Storage backends: relational store, cache tier, authorization engine and
//! external directory

pub mod database;
pub mod directory;
pub mod engine;
pub mod memory;
pub mod redis;

pub use database::Database;
pub use directory::MemoryDirectory;
#[cfg(feature = "ldap")]
pub use directory::LdapDirectory;
pub use engine::CasbinEngine;
pub use memory::MemoryCache;
pub use redis::RedisPool;
