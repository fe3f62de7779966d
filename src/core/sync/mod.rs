//! Role-Policy Association Sync
//!
//! Sole writer of the decision engine's tuple set. Grants write the relational
//! join first and the engine second; revokes narrow the engine first and then
//! remove the join rows. The two steps are not transactional, so a failure of
//! the second step is recorded as a [`ReconciliationTask`] and surfaced to the
//! caller.

mod reconcile;

pub use reconcile::{ReconcileReport, ReconciliationTask, SyncOperation};

use crate::core::models::{Policy, Role, Tuple};
use crate::core::traits::{PermissionEngine, PolicyStore, RoleStore};
use crate::utils::error::{Result, WardenError};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Propagates role/policy association changes into the decision engine
pub struct AssociationSync {
    roles: Arc<dyn RoleStore>,
    policies: Arc<dyn PolicyStore>,
    engine: Arc<dyn PermissionEngine>,
    protected_role: String,
    pending: Mutex<Vec<ReconciliationTask>>,
}

impl std::fmt::Debug for AssociationSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssociationSync")
            .field("protected_role", &self.protected_role)
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}

impl AssociationSync {
    pub fn new(
        roles: Arc<dyn RoleStore>,
        policies: Arc<dyn PolicyStore>,
        engine: Arc<dyn PermissionEngine>,
        protected_role: impl Into<String>,
    ) -> Self {
        Self {
            roles,
            policies,
            engine,
            protected_role: protected_role.into(),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn protected_role(&self) -> &str {
        &self.protected_role
    }

    pub fn is_protected(&self, role: &str) -> bool {
        role == self.protected_role
    }

    /// Grant `policy_ids` to the role
    ///
    /// Returns the tuples now enforced for the grant. Tuples already present
    /// are not an error.
    pub async fn append_association(&self, role_id: i64, policy_ids: &[i64]) -> Result<Vec<Tuple>> {
        let (role, policies) = self.validate(role_id, policy_ids, true).await?;
        self.grant(role, policies).await
    }

    /// Grant without the protected-role check, used when seeding
    pub(crate) async fn grant_initial(&self, role_id: i64, policy_ids: &[i64]) -> Result<Vec<Tuple>> {
        let (role, policies) = self.validate(role_id, policy_ids, false).await?;
        self.grant(role, policies).await
    }

    async fn grant(&self, role: Role, policies: Vec<Policy>) -> Result<Vec<Tuple>> {
        let ids: Vec<i64> = policies.iter().map(|p| p.id).collect();
        let tuples = tuples_for(&role, &policies);

        self.roles.append_role_policies(role.id, &ids).await?;

        if let Err(e) = self.engine.add_tuples(&tuples).await {
            self.record(ReconciliationTask::new(
                SyncOperation::Grant,
                &role,
                ids,
                tuples,
                &e,
            ));
            return Err(e);
        }

        info!("Granted {} policies to role {}", tuples.len(), role.name);
        Ok(tuples)
    }

    /// Revoke `policy_ids` from the role
    pub async fn remove_association(&self, role_id: i64, policy_ids: &[i64]) -> Result<Vec<Tuple>> {
        let (role, policies) = self.validate(role_id, policy_ids, true).await?;
        let ids: Vec<i64> = policies.iter().map(|p| p.id).collect();
        let tuples = tuples_for(&role, &policies);

        self.engine.remove_tuples(&tuples).await?;

        if let Err(e) = self.roles.remove_role_policies(role.id, &ids).await {
            self.record(ReconciliationTask::new(
                SyncOperation::Revoke,
                &role,
                ids,
                tuples,
                &e,
            ));
            return Err(e);
        }

        info!("Revoked {} policies from role {}", tuples.len(), role.name);
        Ok(tuples)
    }

    /// Remove every association of a role ahead of its deletion
    ///
    /// Engine tuples go first, then the relational rows. The protected-role
    /// check does not apply here; deletion of that role is refused upstream.
    pub async fn purge_role(&self, role: &Role) -> Result<()> {
        let policies = self.roles.policies_of_role(role.id).await?;
        if policies.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = policies.iter().map(|p| p.id).collect();
        let tuples = tuples_for(role, &policies);

        self.engine.remove_tuples(&tuples).await?;
        if let Err(e) = self.roles.remove_role_policies(role.id, &ids).await {
            self.record(ReconciliationTask::new(
                SyncOperation::Revoke,
                role,
                ids,
                tuples,
                &e,
            ));
            return Err(e);
        }
        debug!("Purged {} associations of role {}", ids.len(), role.name);
        Ok(())
    }

    async fn validate(
        &self,
        role_id: i64,
        policy_ids: &[i64],
        protect: bool,
    ) -> Result<(Role, Vec<Policy>)> {
        let role = self
            .roles
            .find_role_by_id(role_id)
            .await?
            .ok_or_else(|| WardenError::not_found(format!("role {} not found", role_id)))?;

        if protect && self.is_protected(&role.name) {
            return Err(WardenError::conflict(format!(
                "policies of role {} cannot be changed",
                role.name
            )));
        }

        let wanted: BTreeSet<i64> = policy_ids.iter().copied().collect();
        if wanted.is_empty() {
            return Err(WardenError::validation("no policy ids given"));
        }
        let ids: Vec<i64> = wanted.iter().copied().collect();
        let policies = self.policies.find_policies_by_ids(&ids).await?;

        let found: BTreeSet<i64> = policies.iter().map(|p| p.id).collect();
        let missing: Vec<String> = wanted
            .difference(&found)
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(WardenError::not_found(format!(
                "unknown policy ids: {}",
                missing.join(", ")
            )));
        }

        Ok((role, policies))
    }

    fn record(&self, task: ReconciliationTask) {
        warn!(
            target: "warden::reconcile",
            operation = %task.operation,
            role = %task.role,
            tuples = ?task.tuples,
            cause = %task.cause,
            "partial mutation: relational store and engine diverged"
        );
        self.pending.lock().push(task);
    }

    /// Snapshot of the queued reconciliation tasks
    pub fn pending_tasks(&self) -> Vec<ReconciliationTask> {
        self.pending.lock().clone()
    }

    /// Rebuild the engine's tuples for one role from the relational graph
    pub async fn reconcile_role(&self, role_name: &str) -> Result<ReconcileReport> {
        let expected: BTreeSet<Tuple> = match self.roles.find_role_by_name(role_name).await? {
            Some(role) => {
                let policies = self.roles.policies_of_role(role.id).await?;
                tuples_for(&role, &policies).into_iter().collect()
            }
            None => BTreeSet::new(),
        };
        let actual: BTreeSet<Tuple> = self
            .engine
            .tuples_for_subject(role_name)
            .await?
            .into_iter()
            .collect();

        let report = ReconcileReport {
            added: expected.difference(&actual).cloned().collect(),
            removed: actual.difference(&expected).cloned().collect(),
        };
        if !report.removed.is_empty() {
            self.engine.remove_tuples(&report.removed).await?;
        }
        if !report.added.is_empty() {
            self.engine.add_tuples(&report.added).await?;
        }

        if !report.is_empty() {
            info!(
                "Reconciled role {}: {} added, {} removed",
                role_name,
                report.added.len(),
                report.removed.len()
            );
        }
        Ok(report)
    }

    /// Replay every queued task; tasks that fail again stay queued
    ///
    /// Returns the number of tasks that completed.
    pub async fn drain_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *self.pending.lock());
        let mut done = 0;
        let mut failed = Vec::new();

        for task in tasks {
            match self.replay(&task).await {
                Ok(()) => done += 1,
                Err(e) => {
                    warn!(target: "warden::reconcile", role = %task.role, "replay failed: {}", e);
                    failed.push(task);
                }
            }
        }

        self.pending.lock().extend(failed);
        done
    }

    async fn replay(&self, task: &ReconciliationTask) -> Result<()> {
        match task.operation {
            SyncOperation::Grant => {}
            SyncOperation::Revoke => {
                self.roles
                    .remove_role_policies(task.role_id, &task.policy_ids)
                    .await?;
            }
        }
        self.reconcile_role(&task.role).await.map(|_| ())
    }
}

fn tuples_for(role: &Role, policies: &[Policy]) -> Vec<Tuple> {
    policies.iter().map(|p| p.tuple_for(&role.name)).collect()
}
