//! JWT token handling

mod handler;
#[cfg(test)]
mod tests;
mod types;

pub use types::{Claims, JwtHandler, TokenResponse};
