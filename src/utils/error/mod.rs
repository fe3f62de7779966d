//! Error handling for warden
//!
//! This module defines the error taxonomy shared by every component, the
//! helper constructors used at call sites and the HTTP mapping used by the
//! server layer.

#![allow(missing_docs)]

mod helpers;
mod response;
#[cfg(test)]
mod tests;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{ErrorKind, Result, WardenError};
