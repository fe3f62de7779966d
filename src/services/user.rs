//! User lifecycle
//!
//! Every change to a user's role membership is followed by the two-phase
//! role cache invalidation and then mirrored into the directory. Disabled
//! users keep their role rows but cannot gain roles, and have no directory
//! entry until they are enabled again.

use crate::auth::{JwtHandler, hash_password, verify_password};
use crate::auth::jwt::TokenResponse;
use crate::core::cache::RoleCache;
use crate::core::id::IdAllocator;
use crate::core::mirror::DirectoryMirror;
use crate::core::models::{Page, Paged, Policy, Role, RoleSet, User, UserProfile, UserStatus, now_secs};
use crate::core::traits::{Expiry, RoleStore, UserStore};
use crate::utils::error::{Result, WardenError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// A user's own view of the account
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub user: User,
    pub roles: Vec<String>,
    /// Policies granted through any held role
    pub policies: Vec<Policy>,
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    ids: Arc<IdAllocator>,
    cache: Arc<RoleCache>,
    mirror: DirectoryMirror,
    jwt: Arc<JwtHandler>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        ids: Arc<IdAllocator>,
        cache: Arc<RoleCache>,
        mirror: DirectoryMirror,
        jwt: Arc<JwtHandler>,
    ) -> Self {
        Self {
            users,
            roles,
            ids,
            cache,
            mirror,
            jwt,
        }
    }

    pub async fn register_user(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let name = super::require_name("user", name)?;
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(WardenError::validation(format!("invalid email {}", email)));
        }
        check_password(password)?;

        if self.users.find_user_by_name(&name).await?.is_some() {
            return Err(WardenError::conflict(format!("user {} already exists", name)));
        }
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(WardenError::conflict(format!("email {} already registered", email)));
        }

        let now = now_secs();
        let user = User {
            id: self.ids.next_id()?,
            name,
            email,
            password_hash: hash_password(password)?,
            status: UserStatus::Available,
            nickname: String::new(),
            mobile: String::new(),
            avatar: String::new(),
            created_at: now,
            updated_at: now,
        };
        self.users.create_user(&user).await?;
        self.mirror
            .mirror_user_create(&user.name, &user.email, Some(password))
            .await?;

        info!("Registered user {} ({})", user.name, user.id);
        Ok(user)
    }

    /// Verify credentials and issue a token
    ///
    /// Unknown users, disabled users and wrong passwords all fail the same
    /// way. The user's roles are cached on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let denied = || WardenError::unauthorized("invalid email or password");

        let user = self
            .users
            .find_user_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_else(denied)?;
        if !user.is_available() || !verify_password(password, &user.password_hash)? {
            return Err(denied());
        }

        let roles: RoleSet = self
            .users
            .role_names_for_user(user.id)
            .await?
            .into_iter()
            .collect();
        if let Err(e) = self.cache.set_roles(&user.name, &roles, Expiry::Never).await {
            warn!("Could not warm role cache for {}: {}", user.name, e);
        }

        info!("User {} logged in", user.name);
        self.jwt.issue_token(user.id, &user.name)
    }

    /// Drop the user's cached roles
    pub async fn logout(&self, user_id: i64) -> Result<()> {
        let user = self.require(user_id).await?;
        self.cache.invalidate(&user.name).await
    }

    /// Add roles to an available user
    pub async fn grant_roles(&self, user_id: i64, role_names: &[String]) -> Result<Vec<Role>> {
        let user = self.require_available(user_id).await?;
        let roles = self.resolve_roles(role_names).await?;
        let ids: Vec<i64> = roles.iter().map(|r| r.id).collect();

        self.users.append_user_roles(user.id, &ids).await?;
        self.cache.invalidate_twice(&user.name).await?;
        for role in &roles {
            self.mirror.mirror_membership_add(&role.name, &user.name).await?;
        }

        info!("Granted {} roles to {}", roles.len(), user.name);
        Ok(roles)
    }

    pub async fn revoke_roles(&self, user_id: i64, role_names: &[String]) -> Result<Vec<Role>> {
        let user = self.require(user_id).await?;
        let roles = self.resolve_roles(role_names).await?;
        let ids: Vec<i64> = roles.iter().map(|r| r.id).collect();

        self.users.remove_user_roles(user.id, &ids).await?;
        self.cache.invalidate_twice(&user.name).await?;
        for role in &roles {
            self.mirror
                .mirror_membership_remove(&role.name, &user.name)
                .await?;
        }

        info!("Revoked {} roles from {}", roles.len(), user.name);
        Ok(roles)
    }

    /// Disable the account and remove it from the directory
    ///
    /// Relational role rows are kept so that re-enabling restores access.
    pub async fn disable_user(&self, user_id: i64) -> Result<()> {
        let user = self.require(user_id).await?;
        if !user.is_available() {
            return Ok(());
        }

        self.users
            .update_user_status(user.id, UserStatus::Disabled)
            .await?;
        self.cache.invalidate_twice(&user.name).await?;
        for role in self.users.role_names_for_user(user.id).await? {
            self.mirror.mirror_membership_remove(&role, &user.name).await?;
        }
        self.mirror.mirror_user_delete(&user.name).await?;

        info!("Disabled user {}", user.name);
        Ok(())
    }

    pub async fn enable_user(&self, user_id: i64) -> Result<()> {
        let user = self.require(user_id).await?;
        if user.is_available() {
            return Ok(());
        }

        self.users
            .update_user_status(user.id, UserStatus::Available)
            .await?;
        self.cache.invalidate_twice(&user.name).await?;
        self.mirror
            .mirror_user_create(&user.name, &user.email, None)
            .await?;
        for role in self.users.role_names_for_user(user.id).await? {
            self.mirror.mirror_membership_add(&role, &user.name).await?;
        }

        info!("Enabled user {}", user.name);
        Ok(())
    }

    pub async fn change_password(&self, user_id: i64, old: &str, new: &str) -> Result<()> {
        let user = self.require_available(user_id).await?;
        if !verify_password(old, &user.password_hash)? {
            return Err(WardenError::unauthorized("invalid current password"));
        }
        check_password(new)?;

        self.users
            .update_user_password(user.id, &hash_password(new)?)
            .await?;
        self.mirror.mirror_user_password(&user.name, new).await?;
        info!("Password changed for {}", user.name);
        Ok(())
    }

    /// Update nickname, mobile and avatar; blank fields are ignored
    pub async fn update_profile(&self, user_id: i64, profile: &UserProfile) -> Result<User> {
        let mut user = self.require_available(user_id).await?;
        if !user.apply_profile(profile) {
            return Ok(user);
        }
        self.users.update_user_profile(user.id, profile).await?;
        info!("Profile updated for {}", user.name);
        self.require(user_id).await
    }

    /// The caller's account with its roles and the policies they grant
    pub async fn info(&self, user_id: i64) -> Result<UserInfo> {
        let user = self.require(user_id).await?;
        if !user.is_available() {
            return Err(WardenError::not_found(format!("user {} not found", user_id)));
        }

        let roles = self.users.role_names_for_user(user.id).await?;
        let mut policies: Vec<Policy> = Vec::new();
        for role in self.roles.find_roles_by_names(&roles).await? {
            for policy in self.roles.policies_of_role(role.id).await? {
                if !policies.iter().any(|p| p.id == policy.id) {
                    policies.push(policy);
                }
            }
        }

        Ok(UserInfo {
            user,
            roles,
            policies,
        })
    }

    pub async fn get_user(&self, user_id: i64) -> Result<(User, Vec<String>)> {
        let user = self.require(user_id).await?;
        let roles = self.users.role_names_for_user(user.id).await?;
        Ok((user, roles))
    }

    pub async fn list_users(&self, page: Page) -> Result<Paged<User>> {
        self.users.list_users(page).await
    }

    async fn require(&self, id: i64) -> Result<User> {
        self.users
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| WardenError::not_found(format!("user {} not found", id)))
    }

    async fn require_available(&self, id: i64) -> Result<User> {
        let user = self.require(id).await?;
        if !user.is_available() {
            return Err(WardenError::conflict(format!("user {} is disabled", user.name)));
        }
        Ok(user)
    }

    /// Look up roles by name; any unknown name fails the whole batch
    async fn resolve_roles(&self, names: &[String]) -> Result<Vec<Role>> {
        let wanted: BTreeSet<String> = names.iter().map(|n| n.trim().to_string()).collect();
        if wanted.is_empty() {
            return Err(WardenError::validation("no role names given"));
        }
        let wanted_names: Vec<String> = wanted.iter().cloned().collect();
        let roles = self.roles.find_roles_by_names(&wanted_names).await?;

        let found: BTreeSet<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        let missing: Vec<&str> = wanted
            .iter()
            .map(String::as_str)
            .filter(|n| !found.contains(n))
            .collect();
        if !missing.is_empty() {
            return Err(WardenError::not_found(format!(
                "unknown roles: {}",
                missing.join(", ")
            )));
        }
        Ok(roles)
    }
}

fn check_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WardenError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
