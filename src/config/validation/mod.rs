//! Configuration validation
//!
//! Each configuration section implements [`Validate`]; `Config::validate`
//! runs them in order and wraps the first failure in a config error.

mod trait_def;
mod validators;

#[cfg(test)]
mod tests;

pub use trait_def::Validate;
