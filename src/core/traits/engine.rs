//! Permission-decision engine trait

use crate::core::models::Tuple;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Evaluates (subject, object, action) requests against a tuple set
///
/// `add_tuples` and `remove_tuples` are idempotent: tuples already present
/// (or already absent) are skipped rather than reported as errors.
#[async_trait]
pub trait PermissionEngine: Send + Sync {
    async fn enforce(&self, subject: &str, object: &str, action: &str) -> Result<bool>;

    async fn add_tuples(&self, tuples: &[Tuple]) -> Result<()>;

    async fn remove_tuples(&self, tuples: &[Tuple]) -> Result<()>;

    async fn tuples_for_subject(&self, subject: &str) -> Result<Vec<Tuple>>;
}
