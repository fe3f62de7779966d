//! Identity extraction trait

use crate::core::models::Identity;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Turns a presented credential into a verified identity
#[async_trait]
pub trait IdentityExtractor: Send + Sync {
    /// Verify the raw `Authorization` header value
    ///
    /// Missing or malformed credentials are `WardenError::Unauthorized`.
    async fn extract(&self, authorization: Option<&str>) -> Result<Identity>;
}
