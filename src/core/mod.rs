//! Core functionality for warden
//!
//! This module contains the domain types, the capability traits consumed by
//! the authorization core, and the components built on top of them.

pub mod authz;
pub mod cache;
pub mod id;
pub mod mirror;
pub mod models;
pub mod sync;
pub mod traits;
