use crate::core::models::{DeleteMode, Page, Paged, Policy, Role, Tuple, now_secs};
use crate::core::traits::RoleStore;
use crate::utils::error::{Result, WardenError};
use async_trait::async_trait;
use sea_orm::*;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::super::entities::{self, policy, role, role_policy, user, user_role};
use super::map_write_err;
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    async fn existing_role_model(&self, id: i64) -> Result<role::Model> {
        entities::Role::find_by_id(id)
            .filter(role::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(WardenError::Database)?
            .ok_or_else(|| WardenError::not_found(format!("role {} not found", id)))
    }
}

#[async_trait]
impl RoleStore for SeaOrmDatabase {
    async fn find_role_by_id(&self, id: i64) -> Result<Option<Role>> {
        debug!("Finding role by ID: {}", id);
        let model = entities::Role::find_by_id(id)
            .filter(role::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(WardenError::Database)?;
        Ok(model.map(|m| m.to_domain()))
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        debug!("Finding role by name: {}", name);
        let model = entities::Role::find()
            .filter(role::Column::Name.eq(name))
            .filter(role::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(WardenError::Database)?;
        Ok(model.map(|m| m.to_domain()))
    }

    async fn find_roles_by_names(&self, names: &[String]) -> Result<Vec<Role>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let models = entities::Role::find()
            .filter(role::Column::Name.is_in(names.to_vec()))
            .filter(role::Column::DeletedAt.is_null())
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?;
        Ok(models.iter().map(|m| m.to_domain()).collect())
    }

    async fn create_role(&self, role: &Role) -> Result<()> {
        debug!("Creating role: {}", role.name);

        entities::Role::insert(role::Model::from_domain(role))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| map_write_err(e, &format!("role {}", role.name)))?;
        Ok(())
    }

    async fn update_role_description(&self, id: i64, description: &str) -> Result<()> {
        let mut active: role::ActiveModel = self.existing_role_model(id).await?.into();
        active.description = Set(description.to_string());
        active.updated_at = Set(now_secs());
        active.update(&self.db).await.map_err(WardenError::Database)?;
        Ok(())
    }

    async fn delete_role(&self, id: i64, mode: DeleteMode) -> Result<()> {
        debug!("Deleting role {} ({:?})", id, mode);

        match mode {
            DeleteMode::Soft => {
                let mut active: role::ActiveModel = self.existing_role_model(id).await?.into();
                active.deleted_at = Set(Some(now_secs()));
                active.update(&self.db).await.map_err(WardenError::Database)?;
            }
            DeleteMode::Hard => {
                let txn = self.db.begin().await.map_err(WardenError::Database)?;
                entities::UserRole::delete_many()
                    .filter(user_role::Column::RoleId.eq(id))
                    .exec(&txn)
                    .await
                    .map_err(WardenError::Database)?;
                entities::RolePolicy::delete_many()
                    .filter(role_policy::Column::RoleId.eq(id))
                    .exec(&txn)
                    .await
                    .map_err(WardenError::Database)?;
                entities::Role::delete_by_id(id)
                    .exec(&txn)
                    .await
                    .map_err(WardenError::Database)?;
                txn.commit().await.map_err(WardenError::Database)?;
            }
        }
        Ok(())
    }

    async fn list_roles(&self, page: Page) -> Result<Paged<Role>> {
        let paginator = entities::Role::find()
            .filter(role::Column::DeletedAt.is_null())
            .order_by_asc(role::Column::Id)
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

    async fn users_of_role(&self, role_id: i64) -> Result<Vec<String>> {
        let user_ids: Vec<i64> = entities::UserRole::find()
            .filter(user_role::Column::RoleId.eq(role_id))
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?
            .into_iter()
            .map(|row| row.user_id)
            .collect();

        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = entities::User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::Name)
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?;

        Ok(users.into_iter().map(|u| u.name).collect())
    }

    async fn policies_of_role(&self, role_id: i64) -> Result<Vec<Policy>> {
        let policy_ids: Vec<i64> = entities::RolePolicy::find()
            .filter(role_policy::Column::RoleId.eq(role_id))
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?
            .into_iter()
            .map(|row| row.policy_id)
            .collect();

        if policy_ids.is_empty() {
            return Ok(Vec::new());
        }

        let policies = entities::Policy::find()
            .filter(policy::Column::Id.is_in(policy_ids))
            .filter(policy::Column::DeletedAt.is_null())
            .order_by_asc(policy::Column::Id)
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?;

        Ok(policies.iter().map(|p| p.to_domain()).collect())
    }

    async fn append_role_policies(&self, role_id: i64, policy_ids: &[i64]) -> Result<()> {
        if policy_ids.is_empty() {
            return Ok(());
        }
        debug!("Appending policies {:?} to role {}", policy_ids, role_id);

        let txn = self.db.begin().await.map_err(WardenError::Database)?;

        let existing: HashSet<i64> = entities::RolePolicy::find()
            .filter(role_policy::Column::RoleId.eq(role_id))
            .filter(role_policy::Column::PolicyId.is_in(policy_ids.to_vec()))
            .all(&txn)
            .await
            .map_err(WardenError::Database)?
            .into_iter()
            .map(|row| row.policy_id)
            .collect();

        let missing: Vec<role_policy::ActiveModel> = policy_ids
            .iter()
            .filter(|id| !existing.contains(id))
            .map(|policy_id| role_policy::ActiveModel {
                role_id: Set(role_id),
                policy_id: Set(*policy_id),
            })
            .collect();

        if !missing.is_empty() {
            entities::RolePolicy::insert_many(missing)
                .exec_without_returning(&txn)
                .await
                .map_err(WardenError::Database)?;
        }

        txn.commit().await.map_err(WardenError::Database)?;
        Ok(())
    }

    async fn remove_role_policies(&self, role_id: i64, policy_ids: &[i64]) -> Result<()> {
        if policy_ids.is_empty() {
            return Ok(());
        }
        debug!("Removing policies {:?} from role {}", policy_ids, role_id);

        entities::RolePolicy::delete_many()
            .filter(role_policy::Column::RoleId.eq(role_id))
            .filter(role_policy::Column::PolicyId.is_in(policy_ids.to_vec()))
            .exec(&self.db)
            .await
            .map_err(WardenError::Database)?;
        Ok(())
    }

    async fn all_role_tuples(&self) -> Result<Vec<Tuple>> {
        let roles: HashMap<i64, String> = entities::Role::find()
            .filter(role::Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();

        let policies: HashMap<i64, policy::Model> = entities::Policy::find()
            .filter(policy::Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let links = entities::RolePolicy::find()
            .all(&self.db)
            .await
            .map_err(WardenError::Database)?;

        let mut tuples: Vec<Tuple> = links
            .iter()
            .filter_map(|link| {
                let role = roles.get(&link.role_id)?;
                let policy = policies.get(&link.policy_id)?;
                Some(Tuple::new(role, &policy.path, &policy.method))
            })
            .collect();
        tuples.sort();
        tuples.dedup();
        Ok(tuples)
    }
}
