//! Authorization outcomes

use serde::Serialize;

/// Why a request was denied
///
/// Kept for logs and tests only. Callers see a generic 401 or 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Missing or invalid credential
    Unauthenticated,
    /// Identity names no available user
    UnknownUser,
    /// User holds no role
    NoRole,
    /// No held role grants the action
    NotPermitted,
    /// A cache, store or engine call failed
    DependencyFailure,
}

/// Result of one pass through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Allowed by the named role
    Allow { role: String },
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow { .. })
    }

    /// HTTP status a denied request is answered with
    pub fn status_code(&self) -> u16 {
        match self {
            Verdict::Allow { .. } => 200,
            Verdict::Deny(DenyReason::Unauthenticated) => 401,
            Verdict::Deny(_) => 403,
        }
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Verdict::Allow { .. } => None,
            Verdict::Deny(reason) => Some(*reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let allow = Verdict::Allow {
            role: "viewer".to_string(),
        };
        assert!(allow.is_allowed());
        assert_eq!(allow.status_code(), 200);
        assert_eq!(allow.deny_reason(), None);

        assert_eq!(Verdict::Deny(DenyReason::Unauthenticated).status_code(), 401);
        for reason in [
            DenyReason::UnknownUser,
            DenyReason::NoRole,
            DenyReason::NotPermitted,
            DenyReason::DependencyFailure,
        ] {
            assert_eq!(Verdict::Deny(reason).status_code(), 403);
        }
    }
}
