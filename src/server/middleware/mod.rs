//! HTTP middleware

mod authz;

pub use authz::AuthzMiddleware;
