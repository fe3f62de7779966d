//! Lifecycle services for roles, policies and users
//!
//! Services own the multi-store ordering of each administrative operation and
//! delegate the cross-store pieces to the association sync, the directory
//! mirror and the role cache.

pub mod policy;
pub mod role;
pub mod seed;
pub mod user;

pub use policy::PolicyService;
pub use role::RoleService;
pub use seed::{SeedAdmin, SeedReport, seed};
pub use user::{UserInfo, UserService};

use crate::utils::error::{Result, WardenError};

/// Reject blank names
pub(crate) fn require_name(kind: &str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WardenError::validation(format!("{} name is required", kind)));
    }
    Ok(name.to_string())
}
