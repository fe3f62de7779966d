use crate::core::models::{DeleteMode, Page, Paged, Policy, now_secs};
use crate::core::traits::PolicyStore;
use crate::utils::error::{Result, WardenError};
use async_trait::async_trait;
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, policy, role, role_policy};
use super::map_write_err;
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    async fn existing_policy_model(&self, id: i64) -> Result<policy::Model> {
        entities::Policy::find_by_id(id)
            .filter(policy::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(WardenError::Database)?
            .ok_or_else(|| WardenError::not_found(format!("policy {} not found", id)))
    }
}

#[async_trait]
impl PolicyStore for SeaOrmDatabase {
    async fn find_policy_by_id(&self, id: i64) -> Result<Option<Policy>> {
        debug!("Finding policy by ID: {}", id);
        let model = entities::Policy::find_by_id(id)
            .filter(policy::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(WardenError::Database)?;
        Ok(model.map(|m| m.to_domain()))
    }

    async fn find_policies_by_ids(&self, ids: &[i64]) -> Result<Vec<Policy>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = entities::Policy::find()
            .filter(policy::Column::Id.is_in(ids.to_vec()))
            .filter(policy::Column::DeletedAt.is_null())
            .order_by_asc(policy::Column::Id)
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?;
        Ok(models.iter().map(|m| m.to_domain()).collect())
    }

    async fn find_policy_by_name(&self, name: &str) -> Result<Option<Policy>> {
        let model = entities::Policy::find()
            .filter(policy::Column::Name.eq(name))
            .filter(policy::Column::DeletedAt.is_null())
            .order_by_asc(policy::Column::Id)
            .one(&self.db)
            .await
            .map_err(WardenError::Database)?;
        Ok(model.map(|m| m.to_domain()))
    }

    async fn find_policy_by_triple(
        &self,
        name: &str,
        path: &str,
        method: &str,
    ) -> Result<Option<Policy>> {
        let model = entities::Policy::find()
            .filter(policy::Column::Name.eq(name))
            .filter(policy::Column::Path.eq(path))
            .filter(policy::Column::Method.eq(method))
            .filter(policy::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(WardenError::Database)?;
        Ok(model.map(|m| m.to_domain()))
    }

    async fn create_policy(&self, policy: &Policy) -> Result<()> {
        debug!(
            "Creating policy: {} ({} {})",
            policy.name, policy.method, policy.path
        );

        entities::Policy::insert(policy::Model::from_domain(policy))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| map_write_err(e, &format!("policy {}", policy.name)))?;
        Ok(())
    }

    async fn update_policy_description(&self, id: i64, description: &str) -> Result<()> {
        let mut active: policy::ActiveModel = self.existing_policy_model(id).await?.into();
        active.description = Set(description.to_string());
        active.updated_at = Set(now_secs());
        active.update(&self.db).await.map_err(WardenError::Database)?;
        Ok(())
    }

    async fn delete_policy(&self, id: i64, mode: DeleteMode) -> Result<()> {
        debug!("Deleting policy {} ({:?})", id, mode);

        match mode {
            DeleteMode::Soft => {
                let mut active: policy::ActiveModel =
                    self.existing_policy_model(id).await?.into();
                active.deleted_at = Set(Some(now_secs()));
                active.update(&self.db).await.map_err(WardenError::Database)?;
            }
            DeleteMode::Hard => {
                let txn = self.db.begin().await.map_err(WardenError::Database)?;
                entities::RolePolicy::delete_many()
                    .filter(role_policy::Column::PolicyId.eq(id))
                    .exec(&txn)
                    .await
                    .map_err(WardenError::Database)?;
                entities::Policy::delete_by_id(id)
                    .exec(&txn)
                    .await
                    .map_err(WardenError::Database)?;
                txn.commit().await.map_err(WardenError::Database)?;
            }
        }
        Ok(())
    }

    async fn list_policies(&self, page: Page) -> Result<Paged<Policy>> {
        let paginator = entities::Policy::find()
            .filter(policy::Column::DeletedAt.is_null())
            .order_by_asc(policy::Column::Id)
            .paginate(&self.db, page.page_size);

        let total = paginator.num_items().await.map_err(WardenError::Database)?;
        let models = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(WardenError::Database)?;

        Ok(Paged {
            items: models.iter().map(|m| m.to_domain()).collect(),
            total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    async fn roles_of_policy(&self, policy_id: i64) -> Result<Vec<String>> {
        let role_ids: Vec<i64> = entities::RolePolicy::find()
            .filter(role_policy::Column::PolicyId.eq(policy_id))
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?
            .into_iter()
            .map(|row| row.role_id)
            .collect();

        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let roles = entities::Role::find()
            .filter(role::Column::Id.is_in(role_ids))
            .filter(role::Column::DeletedAt.is_null())
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?;

        Ok(roles.into_iter().map(|r| r.name).collect())
    }
}
