//! Initial data: default policies, the protected and read-only roles, and an
//! optional administrator account
//!
//! Safe to run repeatedly; existing rows are reused.

use crate::Warden;
use crate::core::models::{Policy, Role, User};
use crate::core::traits::{PolicyStore, RoleStore, UserStore};
use crate::utils::error::Result;
use serde::Serialize;
use tracing::info;

/// Read-only role created next to the protected role
pub const VIEW_ROLE: &str = "view";

/// Credentials for the seeded administrator
#[derive(Clone)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub policies_created: Vec<String>,
    pub roles_created: Vec<String>,
    pub admin_created: Option<String>,
}

/// Create whatever part of the initial data is missing
pub async fn seed(app: &Warden, admin: Option<&SeedAdmin>) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let full = ensure_policy(app, "all", "*", "*", "Full access", &mut report).await?;
    let read = ensure_policy(app, "read", "*", "GET", "Read-only access", &mut report).await?;

    let protected = app.config.auth.protected_role.clone();
    let admin_role = ensure_role(app, &protected, "Administrator", &mut report).await?;
    grant_seeded(app, &admin_role, &full).await?;

    let view_role = ensure_role(app, VIEW_ROLE, "Read-only", &mut report).await?;
    grant_seeded(app, &view_role, &read).await?;

    if let Some(admin) = admin {
        let user = match app.database.find_user_by_email(&admin.email).await? {
            Some(user) => user,
            None => {
                let user: User = app
                    .users
                    .register_user(&admin.name, &admin.email, &admin.password)
                    .await?;
                report.admin_created = Some(user.name.clone());
                user
            }
        };
        app.users
            .grant_roles(user.id, std::slice::from_ref(&protected))
            .await?;
    }

    info!(
        "Seed complete: {} policies, {} roles created",
        report.policies_created.len(),
        report.roles_created.len()
    );
    Ok(report)
}

/// Only seeding may write the protected role's policies
async fn grant_seeded(app: &Warden, role: &Role, policy: &Policy) -> Result<()> {
    if app.sync.is_protected(&role.name) {
        app.sync.grant_initial(role.id, &[policy.id]).await?;
    } else {
        app.sync.append_association(role.id, &[policy.id]).await?;
    }
    Ok(())
}

async fn ensure_policy(
    app: &Warden,
    name: &str,
    path: &str,
    method: &str,
    description: &str,
    report: &mut SeedReport,
) -> Result<Policy> {
    if let Some(policy) = app.database.find_policy_by_triple(name, path, method).await? {
        return Ok(policy);
    }
    let policy = app
        .policies
        .create_policy(name, path, method, description)
        .await?;
    report.policies_created.push(policy.name.clone());
    Ok(policy)
}

async fn ensure_role(
    app: &Warden,
    name: &str,
    description: &str,
    report: &mut SeedReport,
) -> Result<Role> {
    if let Some(role) = app.database.find_role_by_name(name).await? {
        return Ok(role);
    }
    let role = app.roles.create_role(name, description).await?;
    report.roles_created.push(role.name.clone());
    Ok(role)
}
