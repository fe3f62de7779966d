//! Configuration data models

#![allow(missing_docs)]

pub mod auth;
pub mod cache;
pub mod directory;
pub mod server;
pub mod storage;

pub use auth::*;
pub use cache::*;
pub use directory::*;
pub use server::*;
pub use storage::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}
