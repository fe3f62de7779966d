//! Authentication: token issuing and verification, password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtHandler};
pub use password::{hash_password, ssha_password, verify_password, verify_ssha};
