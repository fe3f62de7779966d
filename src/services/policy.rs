//! Policy lifecycle

use crate::core::id::IdAllocator;
use crate::core::models::{DeleteMode, Page, Paged, Policy, now_secs};
use crate::core::traits::PolicyStore;
use crate::utils::error::{Result, WardenError};
use std::sync::Arc;
use tracing::info;

const METHODS: &[&str] = &["*", "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

pub struct PolicyService {
    policies: Arc<dyn PolicyStore>,
    ids: Arc<IdAllocator>,
}

impl PolicyService {
    pub fn new(policies: Arc<dyn PolicyStore>, ids: Arc<IdAllocator>) -> Self {
        Self { policies, ids }
    }

    /// Create a (name, path, method) policy
    ///
    /// The method is upper-cased. `*` is accepted for both path and method.
    pub async fn create_policy(
        &self,
        name: &str,
        path: &str,
        method: &str,
        description: &str,
    ) -> Result<Policy> {
        let name = super::require_name("policy", name)?;
        let path = path.trim();
        if path != "*" && !path.starts_with('/') {
            return Err(WardenError::validation(format!(
                "policy path must start with '/': {}",
                path
            )));
        }
        let method = method.trim().to_uppercase();
        if !METHODS.contains(&method.as_str()) {
            return Err(WardenError::validation(format!("unsupported method {}", method)));
        }

        if self
            .policies
            .find_policy_by_triple(&name, path, &method)
            .await?
            .is_some()
        {
            return Err(WardenError::conflict(format!(
                "policy ({}, {}, {}) already exists",
                name, path, method
            )));
        }

        let now = now_secs();
        let policy = Policy {
            id: self.ids.next_id()?,
            name,
            path: path.to_string(),
            method,
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.policies.create_policy(&policy).await?;

        info!("Created policy {} {} {}", policy.name, policy.method, policy.path);
        Ok(policy)
    }

    /// Delete a policy no role references
    pub async fn delete_policy(&self, id: i64) -> Result<()> {
        let policy = self.require(id).await?;
        let roles = self.policies.roles_of_policy(policy.id).await?;
        if !roles.is_empty() {
            return Err(WardenError::conflict(format!(
                "policy {} is used by roles: {}",
                policy.name,
                roles.join(", ")
            )));
        }

        self.policies.delete_policy(policy.id, DeleteMode::Hard).await?;
        info!("Deleted policy {} ({})", policy.name, policy.id);
        Ok(())
    }

    pub async fn update_policy_description(&self, id: i64, description: &str) -> Result<Policy> {
        let mut policy = self.require(id).await?;
        if policy.description == description {
            return Ok(policy);
        }
        self.policies.update_policy_description(id, description).await?;
        policy.description = description.to_string();
        policy.updated_at = now_secs();
        Ok(policy)
    }

    pub async fn get_policy(&self, id: i64) -> Result<Policy> {
        self.require(id).await
    }

    pub async fn list_policies(&self, page: Page) -> Result<Paged<Policy>> {
        self.policies.list_policies(page).await
    }

    async fn require(&self, id: i64) -> Result<Policy> {
        self.policies
            .find_policy_by_id(id)
            .await?
            .ok_or_else(|| WardenError::not_found(format!("policy {} not found", id)))
    }
}
