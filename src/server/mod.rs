//! HTTP server
//!
//! A thin actix-web surface over the services. Every route except the public
//! ones passes through [`middleware::AuthzMiddleware`].

pub mod middleware;
pub mod routes;
#[allow(clippy::module_inception)]
mod server;
pub mod state;

pub use server::HttpServer;
pub use state::AppState;
