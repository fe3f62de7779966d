use crate::core::models::Role;
use sea_orm::Set;
use sea_orm::entity::prelude::*;

/// Role database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,

    #[sea_orm(unique)]
    pub name: String,

    pub description: String,

    pub created_at: i64,

    pub updated_at: i64,

    pub deleted_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn to_domain(&self) -> Role {
        Role {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn from_domain(role: &Role) -> ActiveModel {
        ActiveModel {
            id: Set(role.id),
            name: Set(role.name.clone()),
            description: Set(role.description.clone()),
            created_at: Set(role.created_at),
            updated_at: Set(role.updated_at),
            deleted_at: Set(None),
        }
    }
}
