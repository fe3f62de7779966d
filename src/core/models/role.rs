//! Role domain model

use super::policy::Policy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of role names held by a user, ordered for stable evaluation
pub type RoleSet = BTreeSet<String>;

/// Named bundle of policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Role with its eagerly loaded associations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub policies: Vec<Policy>,
    pub users: Vec<String>,
}
