use crate::core::models::Policy;
use sea_orm::Set;
use sea_orm::entity::prelude::*;

/// Policy database model, unique on (name, path, method)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "policies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    pub name: String,

    /// Resource path pattern, e.g. `/users/:id`
    pub path: String,

    /// Upper-case HTTP method or `*`
    pub method: String,

    pub description: String,

    pub created_at: i64,

    pub updated_at: i64,

    pub deleted_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> Policy {
        Policy {
            id: self.id,
            name: self.name.clone(),
            path: self.path.clone(),
            method: self.method.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn from_domain(policy: &Policy) -> ActiveModel {
        ActiveModel {
            id: Set(policy.id),
            name: Set(policy.name.clone()),
            path: Set(policy.path.clone()),
            method: Set(policy.method.clone()),
            description: Set(policy.description.clone()),
            created_at: Set(policy.created_at),
            updated_at: Set(policy.updated_at),
            deleted_at: Set(None),
        }
    }
}
