//! Directory Mirror
//!
//! Replicates user, role and membership changes into an external directory.
//! When the directory is disabled every operation returns immediately without
//! a call. Failures surface to the caller; stores already written are not
//! rolled back.

use crate::auth::ssha_password;
use crate::core::traits::DirectoryService;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct DirectoryMirror {
    directory: Option<Arc<dyn DirectoryService>>,
}

impl std::fmt::Debug for DirectoryMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryMirror")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl DirectoryMirror {
    pub fn disabled() -> Self {
        Self { directory: None }
    }

    pub fn enabled(directory: Arc<dyn DirectoryService>) -> Self {
        Self {
            directory: Some(directory),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.directory.is_some()
    }

    /// Create the directory entry of a user
    ///
    /// Without a password the entry cannot bind until the next password
    /// change; re-enabled accounts are restored this way because only the
    /// Argon2 hash of their password is kept.
    pub async fn mirror_user_create(
        &self,
        user: &str,
        email: &str,
        password: Option<&str>,
    ) -> Result<()> {
        let Some(directory) = &self.directory else {
            return Ok(());
        };
        let hash = password.map(ssha_password);
        directory.create_user(user, email, hash.as_deref()).await?;
        info!("Created directory user {}", user);
        Ok(())
    }

    pub async fn mirror_user_delete(&self, user: &str) -> Result<()> {
        let Some(directory) = &self.directory else {
            return Ok(());
        };
        directory.delete_user(user).await?;
        info!("Deleted directory user {}", user);
        Ok(())
    }

    pub async fn mirror_user_password(&self, user: &str, password: &str) -> Result<()> {
        let Some(directory) = &self.directory else {
            return Ok(());
        };
        directory
            .update_user_password(user, &ssha_password(password))
            .await?;
        debug!("Updated directory password of {}", user);
        Ok(())
    }

    /// Ensure a group exists for a new role
    pub async fn mirror_role_create(&self, role: &str) -> Result<()> {
        let Some(directory) = &self.directory else {
            return Ok(());
        };
        if directory.group_exists(role).await? {
            debug!("Directory group {} already exists", role);
            return Ok(());
        }
        directory.create_group(role).await?;
        info!("Created directory group {}", role);
        Ok(())
    }

    pub async fn mirror_role_delete(&self, role: &str) -> Result<()> {
        let Some(directory) = &self.directory else {
            return Ok(());
        };
        directory.delete_group(role).await?;
        info!("Deleted directory group {}", role);
        Ok(())
    }

    /// Add a member, creating the role's group first when it is missing
    pub async fn mirror_membership_add(&self, role: &str, user: &str) -> Result<()> {
        let Some(directory) = &self.directory else {
            return Ok(());
        };
        if !directory.group_exists(role).await? {
            directory.create_group(role).await?;
        }
        directory.add_member(role, user).await?;
        debug!("Added {} to directory group {}", user, role);
        Ok(())
    }

    pub async fn mirror_membership_remove(&self, role: &str, user: &str) -> Result<()> {
        let Some(directory) = &self.directory else {
            return Ok(());
        };
        directory.remove_member(role, user).await?;
        debug!("Removed {} from directory group {}", user, role);
        Ok(())
    }
}
