//! Domain models
//!
//! Plain data types shared by the stores, the engine and the services.

pub mod identity;
pub mod policy;
pub mod role;
pub mod user;

pub use identity::Identity;
pub use policy::{Policy, Tuple};
pub use role::{Role, RoleDetail, RoleSet};
pub use user::{User, UserProfile, UserStatus};

use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub page: u64,
    /// Items per page
    pub page_size: u64,
}

impl Page {
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// Clamp to sane bounds
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// One page of results plus the total row count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// How a row is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Set the `deleted_at` marker; the row disappears from normal queries
    Soft,
    /// Remove the row
    Hard,
}

/// Current unix time in seconds
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamping() {
        let page = Page::new(0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.offset(), 0);

        let page = Page::new(3, 1000);
        assert_eq!(page.page_size, Page::MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 200);
    }
}
