use crate::core::models::{User, UserStatus};
use sea_orm::Set;
use sea_orm::entity::prelude::*;

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Allocated identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    pub password_hash: String,

    /// 1 = available, 2 = disabled
    pub status: i16,

    pub nickname: String,

    pub mobile: String,

    pub avatar: String,

    pub created_at: i64,

    pub updated_at: i64,

    pub deleted_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            password_hash: self.password_hash.clone(),
            status: UserStatus::from_code(self.status),
            nickname: self.nickname.clone(),
            mobile: self.mobile.clone(),
            avatar: self.avatar.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn from_domain(user: &User) -> ActiveModel {
        ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            status: Set(user.status.code()),
            nickname: Set(user.nickname.clone()),
            mobile: Set(user.mobile.clone()),
            avatar: Set(user.avatar.clone()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
            deleted_at: Set(None),
        }
    }
}
