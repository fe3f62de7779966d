//! Capability traits consumed by the authorization core
//!
//! Each external collaborator (cache tier, decision engine, relational
//! store, directory service, token verifier) is reached only through one of
//! these traits. Concrete implementations live under `crate::storage` and
//! `crate::auth` and are injected at construction time.

pub mod cache;
pub mod directory;
pub mod engine;
pub mod identity;
pub mod store;

pub use cache::{CacheBackend, Expiry};
pub use directory::DirectoryService;
pub use engine::PermissionEngine;
pub use identity::IdentityExtractor;
pub use store::{PolicyStore, RoleStore, UserStore};
