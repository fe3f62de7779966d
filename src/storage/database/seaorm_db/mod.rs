//! SeaORM-backed relational store
//!
//! ## Module Structure
//!
//! - `types` - Database handle and backend indicator
//! - `connection` - Connecting, migrating, health checks
//! - `user_ops` - `UserStore` implementation
//! - `role_ops` - `RoleStore` implementation
//! - `policy_ops` - `PolicyStore` implementation

mod connection;
mod policy_ops;
mod role_ops;
mod types;
mod user_ops;

pub use types::{DatabaseBackendType, SeaOrmDatabase};

use crate::utils::error::WardenError;
use sea_orm::{DbErr, SqlErr};

/// Map unique-constraint violations to `Conflict`, everything else to `Database`
pub(super) fn map_write_err(err: DbErr, what: &str) -> WardenError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            WardenError::conflict(format!("{} already exists", what))
        }
        _ => WardenError::Database(err),
    }
}
