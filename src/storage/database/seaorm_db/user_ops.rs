use crate::core::models::{Page, Paged, User, UserProfile, UserStatus, now_secs};
use crate::core::traits::UserStore;
use crate::utils::error::{Result, WardenError};
use async_trait::async_trait;
use sea_orm::*;
use std::collections::HashSet;
use tracing::debug;

use super::super::entities::{self, role, user, user_role};
use super::map_write_err;
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    async fn find_user_model(&self, condition: Condition) -> Result<Option<user::Model>> {
        entities::User::find()
            .filter(condition)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(WardenError::Database)
    }

    async fn existing_user_model(&self, id: i64) -> Result<user::Model> {
        self.find_user_model(Condition::all().add(user::Column::Id.eq(id)))
            .await?
            .ok_or_else(|| WardenError::not_found(format!("user {} not found", id)))
    }
}

#[async_trait]
impl UserStore for SeaOrmDatabase {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        debug!("Finding user by ID: {}", id);
        let model = self
            .find_user_model(Condition::all().add(user::Column::Id.eq(id)))
            .await?;
        Ok(model.map(|m| m.to_domain()))
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        debug!("Finding user by name: {}", name);
        let model = self
            .find_user_model(Condition::all().add(user::Column::Name.eq(name)))
            .await?;
        Ok(model.map(|m| m.to_domain()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        debug!("Finding user by email: {}", email);
        let model = self
            .find_user_model(Condition::all().add(user::Column::Email.eq(email)))
            .await?;
        Ok(model.map(|m| m.to_domain()))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        debug!("Creating user: {}", user.name);

        entities::User::insert(user::Model::from_domain(user))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| map_write_err(e, "user"))?;
        Ok(())
    }

    async fn update_user_status(&self, id: i64, status: UserStatus) -> Result<()> {
        debug!("Updating status for user {}: {:?}", id, status);

        let mut active: user::ActiveModel = self.existing_user_model(id).await?.into();
        active.status = Set(status.code());
        active.updated_at = Set(now_secs());
        active.update(&self.db).await.map_err(WardenError::Database)?;
        Ok(())
    }

    async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<()> {
        debug!("Updating password for user: {}", id);

        let mut active: user::ActiveModel = self.existing_user_model(id).await?.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(now_secs());
        active.update(&self.db).await.map_err(WardenError::Database)?;
        Ok(())
    }

    async fn update_user_profile(&self, id: i64, profile: &UserProfile) -> Result<()> {
        debug!("Updating profile for user: {}", id);

        let model = self.existing_user_model(id).await?;
        let mut user = model.to_domain();
        if !user.apply_profile(profile) {
            return Ok(());
        }

        let mut active: user::ActiveModel = model.into();
        active.nickname = Set(user.nickname);
        active.mobile = Set(user.mobile);
        active.avatar = Set(user.avatar);
        active.updated_at = Set(now_secs());
        active.update(&self.db).await.map_err(WardenError::Database)?;
        Ok(())
    }

    async fn list_users(&self, page: Page) -> Result<Paged<User>> {
        let paginator = entities::User::find()
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::Id)
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

    async fn role_names_for_user(&self, user_id: i64) -> Result<Vec<String>> {
        let role_ids: Vec<i64> = entities::UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
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

    async fn append_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()> {
        if role_ids.is_empty() {
            return Ok(());
        }
        debug!("Appending roles {:?} to user {}", role_ids, user_id);

        let txn = self.db.begin().await.map_err(WardenError::Database)?;

        let existing: HashSet<i64> = entities::UserRole::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.is_in(role_ids.to_vec()))
            .all(&txn)
            .await
            .map_err(WardenError::Database)?
            .into_iter()
            .map(|row| row.role_id)
            .collect();

        let missing: Vec<user_role::ActiveModel> = role_ids
            .iter()
            .filter(|id| !existing.contains(id))
            .map(|role_id| user_role::ActiveModel {
                user_id: Set(user_id),
                role_id: Set(*role_id),
            })
            .collect();

        if !missing.is_empty() {
            entities::UserRole::insert_many(missing)
                .exec_without_returning(&txn)
                .await
                .map_err(WardenError::Database)?;
        }

        txn.commit().await.map_err(WardenError::Database)?;
        Ok(())
    }

    async fn remove_user_roles(&self, user_id: i64, role_ids: &[i64]) -> Result<()> {
        if role_ids.is_empty() {
            return Ok(());
        }
        debug!("Removing roles {:?} from user {}", role_ids, user_id);

        entities::UserRole::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.is_in(role_ids.to_vec()))
            .exec(&self.db)
            .await
            .map_err(WardenError::Database)?;
        Ok(())
    }
}
