//! Compensation records for partially applied association changes

use crate::core::models::{Role, Tuple};
use crate::utils::error::WardenError;
use serde::Serialize;

/// Which association change was interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    /// Join rows written, engine tuples missing
    Grant,
    /// Engine tuples removed, join rows still present
    Revoke,
}

impl std::fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOperation::Grant => write!(f, "grant"),
            SyncOperation::Revoke => write!(f, "revoke"),
        }
    }
}

/// Enough state to finish an interrupted association change
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationTask {
    pub operation: SyncOperation,
    pub role_id: i64,
    pub role: String,
    pub policy_ids: Vec<i64>,
    pub tuples: Vec<Tuple>,
    pub cause: String,
    pub recorded_at: i64,
}

impl ReconciliationTask {
    pub(super) fn new(
        operation: SyncOperation,
        role: &Role,
        policy_ids: Vec<i64>,
        tuples: Vec<Tuple>,
        cause: &WardenError,
    ) -> Self {
        Self {
            operation,
            role_id: role.id,
            role: role.name.clone(),
            policy_ids,
            tuples,
            cause: cause.to_string(),
            recorded_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Tuples changed by a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: Vec<Tuple>,
    pub removed: Vec<Tuple>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_captures_role_and_cause() {
        let role = Role {
            id: 9,
            name: "viewer".to_string(),
            description: String::new(),
            created_at: 0,
            updated_at: 0,
        };
        let task = ReconciliationTask::new(
            SyncOperation::Grant,
            &role,
            vec![1],
            vec![Tuple::new("viewer", "/reports", "GET")],
            &WardenError::engine("adapter closed"),
        );
        assert_eq!(task.role_id, 9);
        assert_eq!(task.role, "viewer");
        assert!(task.cause.contains("adapter closed"));
        assert_eq!(task.operation.to_string(), "grant");
    }
}
