//! Relational store traits
//!
//! Normal queries never return soft-deleted rows. Join-table writes are
//! idempotent: appending an existing association or removing a missing one
//! succeeds without change.

use crate::core::models::{DeleteMode, Page, Paged, Policy, Role, Tuple, User, UserProfile, UserStatus};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn create_user(&self, user: &User) -> Result<()>;

    async fn update_user_status(&self, id: i64, status: UserStatus) -> Result<()>;

    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<()>;

    /// Write the non-blank profile fields; unchanged profiles are not written
    async fn update_user_profile(&self, id: i64, profile: &UserProfile) -> Result<()>;

    async fn list_users(&self, page: Page) -> Result<Paged<User>>;

    /// Names of the roles held by the user
    async fn role_names_for_user(&self, user_id: i64) -> Result<Vec<String>>;

    async fn append_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()>;

    async fn remove_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_role_by_id(&self, id: i64) -> Result<Option<Role>>;

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>>;

    async fn find_roles_by_names(&self, names: &[String]) -> Result<Vec<Role>>;

    async fn create_role(&self, role: &Role) -> Result<()>;

    async fn update_role_description(&self, id: i64, description: &str) -> Result<()>;

    async fn delete_role(&self, id: i64, mode: DeleteMode) -> Result<()>;

    async fn list_roles(&self, page: Page) -> Result<Paged<Role>>;

    /// Names of the users holding the role
    async fn users_of_role(&self, role_id: i64) -> Result<Vec<String>>;

    async fn policies_of_role(&self, role_id: i64) -> Result<Vec<Policy>>;

    async fn append_role_policies(&self, role_id: i64, policy_ids: &[i64]) -> Result<()>;

    async fn remove_role_policies(&self, role_id: i64, policy_ids: &[i64]) -> Result<()>;

    /// Every (role, path, method) tuple derivable from the role/policy graph
    async fn all_role_tuples(&self) -> Result<Vec<Tuple>>;
}

#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn find_policy_by_id(&self, id: i64) -> Result<Option<Policy>>;

    async fn find_policies_by_ids(&self, ids: &[i64]) -> Result<Vec<Policy>>;

    async fn find_policy_by_name(&self, name: &str) -> Result<Option<Policy>>;

    async fn find_policy_by_triple(
        &self,
        name: &str,
        path: &str,
        method: &str,
    ) -> Result<Option<Policy>>;

    async fn create_policy(&self, policy: &Policy) -> Result<()>;

    async fn update_policy_description(&self, id: i64, description: &str) -> Result<()>;

    async fn delete_policy(&self, id: i64, mode: DeleteMode) -> Result<()>;

    async fn list_policies(&self, page: Page) -> Result<Paged<Policy>>;

    /// Names of the roles referencing the policy
    async fn roles_of_policy(&self, policy_id: i64) -> Result<Vec<String>>;
}
