//! Casbin-backed permission-decision engine
//!
//! Tuples are held in memory and rebuilt from the relational store at
//! startup; the relational graph stays the source of truth.

use crate::core::models::Tuple;
use crate::core::traits::{PermissionEngine, RoleStore};
use crate::utils::error::{Result, WardenError};
use async_trait::async_trait;
use casbin::{CoreApi, DefaultModel, Enforcer, MemoryAdapter, MgmtApi};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Role/path/method model; `*` as path or method matches anything
pub const MODEL_CONF: &str = r#"
[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = r.sub == p.sub && (p.obj == "*" || keyMatch2(r.obj, p.obj)) && (p.act == "*" || r.act == p.act)
"#;

/// Casbin enforcer behind an async read/write lock
pub struct CasbinEngine {
    enforcer: RwLock<Enforcer>,
}

impl std::fmt::Debug for CasbinEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasbinEngine").finish_non_exhaustive()
    }
}

impl CasbinEngine {
    /// Build an empty engine
    pub async fn new() -> Result<Self> {
        let model = DefaultModel::from_str(MODEL_CONF).await?;
        let adapter = MemoryAdapter::default();
        let enforcer = Enforcer::new(model, adapter).await?;

        Ok(Self {
            enforcer: RwLock::new(enforcer),
        })
    }

    /// Build an engine holding exactly the tuples of the relational role/policy graph
    pub async fn bootstrap(store: &dyn RoleStore) -> Result<Self> {
        let engine = Self::new().await?;
        let tuples = store.all_role_tuples().await?;
        engine.add_tuples(&tuples).await?;
        info!("Permission engine loaded with {} tuples", tuples.len());
        Ok(engine)
    }

    /// Every tuple currently held
    pub async fn all_tuples(&self) -> Vec<Tuple> {
        let enforcer = self.enforcer.read().await;
        enforcer
            .get_policy()
            .iter()
            .filter_map(|rule| Tuple::from_rule(rule))
            .collect()
    }
}

#[async_trait]
impl PermissionEngine for CasbinEngine {
    async fn enforce(&self, subject: &str, object: &str, action: &str) -> Result<bool> {
        let enforcer = self.enforcer.read().await;
        let allowed = enforcer
            .enforce((subject, object, action))
            .map_err(|e| WardenError::engine(format!("enforce failed: {}", e)))?;
        debug!(subject, object, action, allowed, "Engine decision");
        Ok(allowed)
    }

    async fn add_tuples(&self, tuples: &[Tuple]) -> Result<()> {
        let mut enforcer = self.enforcer.write().await;

        let mut rules: Vec<Vec<String>> = Vec::with_capacity(tuples.len());
        for tuple in tuples {
            let rule = tuple.clone().into_rule();
            if !enforcer.has_policy(rule.clone()) && !rules.contains(&rule) {
                rules.push(rule);
            }
        }
        if rules.is_empty() {
            return Ok(());
        }

        debug!("Adding {} engine tuples", rules.len());
        let added = enforcer.add_policies(rules).await?;
        if !added {
            return Err(WardenError::engine("engine rejected tuple insertion"));
        }
        Ok(())
    }

    async fn remove_tuples(&self, tuples: &[Tuple]) -> Result<()> {
        let mut enforcer = self.enforcer.write().await;

        let mut rules: Vec<Vec<String>> = Vec::with_capacity(tuples.len());
        for tuple in tuples {
            let rule = tuple.clone().into_rule();
            if enforcer.has_policy(rule.clone()) && !rules.contains(&rule) {
                rules.push(rule);
            }
        }
        if rules.is_empty() {
            return Ok(());
        }

        debug!("Removing {} engine tuples", rules.len());
        let removed = enforcer.remove_policies(rules).await?;
        if !removed {
            return Err(WardenError::engine("engine rejected tuple removal"));
        }
        Ok(())
    }

    async fn tuples_for_subject(&self, subject: &str) -> Result<Vec<Tuple>> {
        let enforcer = self.enforcer.read().await;
        Ok(enforcer
            .get_filtered_policy(0, vec![subject.to_string()])
            .iter()
            .filter_map(|rule| Tuple::from_rule(rule))
            .collect())
    }
}
