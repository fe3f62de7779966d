//! HTTP route modules

pub mod auth;
pub mod health;
pub mod policies;
pub mod roles;
pub mod users;

use crate::core::models::Page;
use actix_web::web;
use serde::{Deserialize, Serialize};

/// Register every route
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(auth::configure_routes)
        .configure(roles::configure_routes)
        .configure(policies::configure_routes)
        .configure(users::configure_routes);
}

/// Standard API response structure
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success with no payload
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
        }
    }
}

/// `?page=&page_size=` query parameters
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        let default = Page::default();
        Page::new(
            self.page.unwrap_or(default.page),
            self.page_size.unwrap_or(default.page_size),
        )
    }
}
