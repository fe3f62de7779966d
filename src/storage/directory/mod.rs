//! Directory service backends
//!
//! - `ldap` - LDAP groups via `ldap3` (feature `ldap`)
//! - `memory` - In-process directory for tests and local runs

#[cfg(feature = "ldap")]
mod ldap;
mod memory;

#[cfg(feature = "ldap")]
pub use ldap::LdapDirectory;
pub use memory::{DirectoryUser, MemoryDirectory};
