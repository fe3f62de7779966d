//! User domain model

use serde::{Deserialize, Serialize};

/// Account status, stored as its integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Available,
    Disabled,
}

impl UserStatus {
    pub fn code(self) -> i16 {
        match self {
            UserStatus::Available => 1,
            UserStatus::Disabled => 2,
        }
    }

    /// Unknown codes are treated as disabled
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => UserStatus::Available,
            _ => UserStatus::Disabled,
        }
    }
}

/// User account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: UserStatus,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub avatar: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn is_available(&self) -> bool {
        self.status == UserStatus::Available
    }

    /// Apply the non-empty fields of `profile`; returns whether anything changed
    pub fn apply_profile(&mut self, profile: &UserProfile) -> bool {
        let mut changed = false;
        for (field, value) in [
            (&mut self.nickname, &profile.nickname),
            (&mut self.mobile, &profile.mobile),
            (&mut self.avatar, &profile.avatar),
        ] {
            let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
                continue;
            };
            if field.as_str() != value {
                *field = value.to_string();
                changed = true;
            }
        }
        changed
    }
}

/// Self-service profile change; absent or blank fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub nickname: Option<String>,
    pub mobile: Option<String>,
    pub avatar: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("status", &self.status)
            .finish()
    }
}
