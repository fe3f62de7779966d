//! In-process directory backend

use crate::core::traits::DirectoryService;
use crate::utils::error::{Result, WardenError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeSet;

/// Directory user entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub email: String,
    pub password_hash: Option<String>,
}

/// Users, groups and members held in maps; mirrors the LDAP backend's semantics
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: DashMap<String, DirectoryUser>,
    groups: DashMap<String, BTreeSet<String>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Member user names of a group, `None` when the group does not exist
    pub fn members(&self, group: &str) -> Option<Vec<String>> {
        self.groups
            .get(group)
            .map(|members| members.iter().cloned().collect())
    }

    pub fn user(&self, name: &str) -> Option<DirectoryUser> {
        self.users.get(name).map(|user| user.clone())
    }

    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.iter().map(|g| g.key().clone()).collect();
        names.sort();
        names
    }
}

#[async_trait]
impl DirectoryService for MemoryDirectory {
    async fn create_user(&self, user: &str, email: &str, password_hash: Option<&str>) -> Result<()> {
        if self.users.contains_key(user) {
            return Err(WardenError::directory(format!("user {} already exists", user)));
        }
        self.users.insert(
            user.to_string(),
            DirectoryUser {
                email: email.to_string(),
                password_hash: password_hash.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn delete_user(&self, user: &str) -> Result<()> {
        self.users.remove(user);
        Ok(())
    }

    async fn update_user_password(&self, user: &str, password_hash: &str) -> Result<()> {
        let mut entry = self
            .users
            .get_mut(user)
            .ok_or_else(|| WardenError::directory(format!("no such user {}", user)))?;
        entry.password_hash = Some(password_hash.to_string());
        Ok(())
    }

    async fn group_exists(&self, group: &str) -> Result<bool> {
        Ok(self.groups.contains_key(group))
    }

    async fn create_group(&self, group: &str) -> Result<()> {
        if self.groups.contains_key(group) {
            return Err(WardenError::directory(format!(
                "group {} already exists",
                group
            )));
        }
        self.groups.insert(group.to_string(), BTreeSet::new());
        Ok(())
    }

    async fn delete_group(&self, group: &str) -> Result<()> {
        self.groups.remove(group);
        Ok(())
    }

    async fn add_member(&self, group: &str, user: &str) -> Result<()> {
        let mut members = self
            .groups
            .get_mut(group)
            .ok_or_else(|| WardenError::directory(format!("no such group {}", group)))?;
        members.insert(user.to_string());
        Ok(())
    }

    async fn remove_member(&self, group: &str, user: &str) -> Result<()> {
        let mut members = self
            .groups
            .get_mut(group)
            .ok_or_else(|| WardenError::directory(format!("no such group {}", group)))?;
        members.remove(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_group_lifecycle() {
        let dir = MemoryDirectory::new();
        assert!(!dir.group_exists("viewer").await.unwrap());

        dir.create_group("viewer").await.unwrap();
        assert!(dir.create_group("viewer").await.is_err());

        dir.add_member("viewer", "alice").await.unwrap();
        dir.add_member("viewer", "alice").await.unwrap();
        assert_eq!(dir.members("viewer"), Some(vec!["alice".to_string()]));

        dir.remove_member("viewer", "alice").await.unwrap();
        assert_eq!(dir.members("viewer"), Some(vec![]));

        dir.delete_group("viewer").await.unwrap();
        assert!(dir.add_member("viewer", "alice").await.is_err());
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let dir = MemoryDirectory::new();
        assert!(dir.update_user_password("bob", "{SSHA}x").await.is_err());

        dir.create_user("bob", "bob@example.com", None).await.unwrap();
        assert!(dir.create_user("bob", "bob@example.com", None).await.is_err());
        assert_eq!(dir.user("bob").unwrap().password_hash, None);

        dir.update_user_password("bob", "{SSHA}x").await.unwrap();
        assert_eq!(dir.user("bob").unwrap().password_hash.as_deref(), Some("{SSHA}x"));

        dir.delete_user("bob").await.unwrap();
        dir.delete_user("bob").await.unwrap();
        assert!(dir.user("bob").is_none());
    }
}
