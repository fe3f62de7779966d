//! Policy and permission tuple models

use serde::{Deserialize, Serialize};

/// A named (path, method) permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: i64,
    pub name: String,
    pub path: String,
    pub method: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Policy {
    /// The engine tuple granting this policy to `role`
    pub fn tuple_for(&self, role: &str) -> Tuple {
        Tuple::new(role, &self.path, &self.method)
    }
}

/// A (role, resource path, action) triple held by the decision engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tuple {
    pub subject: String,
    pub object: String,
    pub action: String,
}

impl Tuple {
    pub fn new(
        subject: impl Into<String>,
        object: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
            action: action.into(),
        }
    }

    pub fn into_rule(self) -> Vec<String> {
        vec![self.subject, self.object, self.action]
    }

    /// Build from an engine rule; rules shorter than three fields are rejected
    pub fn from_rule(rule: &[String]) -> Option<Self> {
        match rule {
            [subject, object, action, ..] => Some(Self::new(subject, object, action)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.object, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_conversion() {
        let tuple = Tuple::new("viewer", "/reports", "GET");
        let rule = tuple.clone().into_rule();
        assert_eq!(rule, vec!["viewer", "/reports", "GET"]);
        assert_eq!(Tuple::from_rule(&rule), Some(tuple));
        assert_eq!(Tuple::from_rule(&["viewer".to_string()]), None);
    }
}
