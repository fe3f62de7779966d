//! Database storage implementation using SeaORM
//!
//! This module provides the relational source of truth for users, roles,
//! policies and their associations.

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// SeaORM database implementation module
pub mod seaorm_db;

pub use seaorm_db::SeaOrmDatabase as Database;
pub use seaorm_db::DatabaseBackendType;
