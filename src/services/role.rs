//! Role lifecycle

use crate::core::id::IdAllocator;
use crate::core::mirror::DirectoryMirror;
use crate::core::models::{DeleteMode, Page, Paged, Role, RoleDetail, Tuple, now_secs};
use crate::core::sync::AssociationSync;
use crate::core::traits::RoleStore;
use crate::utils::error::{Result, WardenError};
use std::sync::Arc;
use tracing::info;

pub struct RoleService {
    roles: Arc<dyn RoleStore>,
    ids: Arc<IdAllocator>,
    sync: Arc<AssociationSync>,
    mirror: DirectoryMirror,
}

impl RoleService {
    pub fn new(
        roles: Arc<dyn RoleStore>,
        ids: Arc<IdAllocator>,
        sync: Arc<AssociationSync>,
        mirror: DirectoryMirror,
    ) -> Self {
        Self {
            roles,
            ids,
            sync,
            mirror,
        }
    }

    /// Create a role, mirroring its group into the directory first
    pub async fn create_role(&self, name: &str, description: &str) -> Result<Role> {
        let name = super::require_name("role", name)?;
        if self.roles.find_role_by_name(&name).await?.is_some() {
            return Err(WardenError::conflict(format!("role {} already exists", name)));
        }

        let now = now_secs();
        let role = Role {
            id: self.ids.next_id()?,
            name,
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.mirror.mirror_role_create(&role.name).await?;
        self.roles.create_role(&role).await?;

        info!("Created role {} ({})", role.name, role.id);
        Ok(role)
    }

    /// Delete a role that no user holds
    ///
    /// Order: directory group, engine tuples, role/policy rows, role row.
    /// Nothing is touched when the role is protected or still has members.
    pub async fn delete_role(&self, id: i64) -> Result<()> {
        let role = self.require(id).await?;
        if self.sync.is_protected(&role.name) {
            return Err(WardenError::conflict(format!(
                "role {} cannot be deleted",
                role.name
            )));
        }

        let users = self.roles.users_of_role(role.id).await?;
        if !users.is_empty() {
            return Err(WardenError::conflict(format!(
                "role {} is held by users: {}",
                role.name,
                users.join(", ")
            )));
        }

        self.mirror.mirror_role_delete(&role.name).await?;
        self.sync.purge_role(&role).await?;
        self.roles.delete_role(role.id, DeleteMode::Hard).await?;

        info!("Deleted role {} ({})", role.name, role.id);
        Ok(())
    }

    pub async fn update_role_description(&self, id: i64, description: &str) -> Result<Role> {
        let mut role = self.require(id).await?;
        if role.description == description {
            return Ok(role);
        }
        self.roles.update_role_description(id, description).await?;
        role.description = description.to_string();
        role.updated_at = now_secs();
        Ok(role)
    }

    pub async fn grant_policies(&self, id: i64, policy_ids: &[i64]) -> Result<Vec<Tuple>> {
        self.sync.append_association(id, policy_ids).await
    }

    pub async fn revoke_policies(&self, id: i64, policy_ids: &[i64]) -> Result<Vec<Tuple>> {
        self.sync.remove_association(id, policy_ids).await
    }

    /// Role with its policies and member user names
    pub async fn get_role(&self, id: i64) -> Result<RoleDetail> {
        let role = self.require(id).await?;
        let policies = self.roles.policies_of_role(role.id).await?;
        let users = self.roles.users_of_role(role.id).await?;
        Ok(RoleDetail {
            role,
            policies,
            users,
        })
    }

    pub async fn list_roles(&self, page: Page) -> Result<Paged<Role>> {
        self.roles.list_roles(page).await
    }

    async fn require(&self, id: i64) -> Result<Role> {
        self.roles
            .find_role_by_id(id)
            .await?
            .ok_or_else(|| WardenError::not_found(format!("role {} not found", id)))
    }
}
