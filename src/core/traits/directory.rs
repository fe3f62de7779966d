//! External directory trait

use crate::utils::error::Result;
use async_trait::async_trait;

/// User, group and membership operations on an external user directory
///
/// Groups are keyed by role name, users and members by user name. Passwords
/// arrive already hashed in a scheme the directory understands.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn create_user(&self, user: &str, email: &str, password_hash: Option<&str>) -> Result<()>;

    /// Removing a missing user succeeds
    async fn delete_user(&self, user: &str) -> Result<()>;

    async fn update_user_password(&self, user: &str, password_hash: &str) -> Result<()>;

    async fn group_exists(&self, group: &str) -> Result<bool>;

    async fn create_group(&self, group: &str) -> Result<()>;

    async fn delete_group(&self, group: &str) -> Result<()>;

    async fn add_member(&self, group: &str, user: &str) -> Result<()>;

    async fn remove_member(&self, group: &str, user: &str) -> Result<()>;
}
