//! Authorization Decision Pipeline
//!
//! Per request: parse the identity, resolve the caller's roles through the
//! role cache (loading from the relational store on a miss), then ask the
//! decision engine about each role in turn. The first role that grants the
//! action allows the request. Any dependency failure denies it.

mod verdict;

pub use verdict::{DenyReason, Verdict};

use crate::core::cache::RoleCache;
use crate::core::models::{Identity, RoleSet};
use crate::core::traits::{Expiry, IdentityExtractor, PermissionEngine, UserStore};
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Roles resolved for a caller, or the reason none could be used
enum Resolution {
    Roles(RoleSet),
    Denied(DenyReason),
}

pub struct AuthorizationPipeline {
    cache: Arc<RoleCache>,
    users: Arc<dyn UserStore>,
    engine: Arc<dyn PermissionEngine>,
}

impl std::fmt::Debug for AuthorizationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationPipeline")
            .field("cache", &self.cache)
            .finish()
    }
}

impl AuthorizationPipeline {
    pub fn new(
        cache: Arc<RoleCache>,
        users: Arc<dyn UserStore>,
        engine: Arc<dyn PermissionEngine>,
    ) -> Self {
        Self {
            cache,
            users,
            engine,
        }
    }

    /// Verify the credential, then authorize the request
    pub async fn authorize_request(
        &self,
        extractor: &dyn IdentityExtractor,
        authorization: Option<&str>,
        path: &str,
        method: &str,
    ) -> (Option<Identity>, Verdict) {
        match extractor.extract(authorization).await {
            Ok(identity) => {
                let verdict = self.resolve_and_authorize(&identity, path, method).await;
                (Some(identity), verdict)
            }
            Err(e) => {
                debug!("Rejected credential for {} {}: {}", method, path, e);
                (None, Verdict::Deny(DenyReason::Unauthenticated))
            }
        }
    }

    /// Verify the credential and that it names an available user
    ///
    /// Used for self-service routes; no role is evaluated.
    pub async fn authenticate_request(
        &self,
        extractor: &dyn IdentityExtractor,
        authorization: Option<&str>,
    ) -> std::result::Result<Identity, DenyReason> {
        let identity = match extractor.extract(authorization).await {
            Ok(identity) => identity,
            Err(e) => {
                debug!("Rejected credential: {}", e);
                return Err(DenyReason::Unauthenticated);
            }
        };

        match self.users.find_user_by_id(identity.user_id).await {
            Ok(Some(user)) if user.is_available() && user.name == identity.user_name => {
                Ok(identity)
            }
            Ok(_) => {
                warn!(
                    target: "warden::audit",
                    user = %identity.user_name,
                    "request denied: unknown or disabled user"
                );
                Err(DenyReason::UnknownUser)
            }
            Err(e) => {
                error!(user = %identity.user_name, "authentication failed closed: {}", e);
                Err(DenyReason::DependencyFailure)
            }
        }
    }

    /// Decide whether `identity` may perform `method` on `path`
    pub async fn resolve_and_authorize(
        &self,
        identity: &Identity,
        path: &str,
        method: &str,
    ) -> Verdict {
        match self.decide(identity, path, method).await {
            Ok(verdict) => verdict,
            Err(e) => {
                error!(
                    user = %identity.user_name,
                    path,
                    method,
                    "authorization failed closed: {}",
                    e
                );
                Verdict::Deny(DenyReason::DependencyFailure)
            }
        }
    }

    async fn decide(&self, identity: &Identity, path: &str, method: &str) -> Result<Verdict> {
        let roles = match self.resolve_roles(identity).await? {
            Resolution::Roles(roles) => roles,
            Resolution::Denied(reason) => {
                warn!(
                    target: "warden::audit",
                    user = %identity.user_name,
                    roles = "",
                    path,
                    method,
                    reason = ?reason,
                    "request denied"
                );
                return Ok(Verdict::Deny(reason));
            }
        };

        if roles.is_empty() {
            warn!(
                target: "warden::audit",
                user = %identity.user_name,
                roles = "",
                path,
                method,
                "request denied: no role"
            );
            return Ok(Verdict::Deny(DenyReason::NoRole));
        }

        for role in &roles {
            if self.engine.enforce(role, path, method).await? {
                debug!("{} allowed {} {} via {}", identity.user_name, method, path, role);
                return Ok(Verdict::Allow { role: role.clone() });
            }
        }

        let tried: Vec<&str> = roles.iter().map(String::as_str).collect();
        warn!(
            target: "warden::audit",
            user = %identity.user_name,
            roles = %tried.join(","),
            path,
            method,
            "request denied: not permitted"
        );
        Ok(Verdict::Deny(DenyReason::NotPermitted))
    }

    async fn resolve_roles(&self, identity: &Identity) -> Result<Resolution> {
        if let Some(roles) = self.cache.get_roles(&identity.user_name).await? {
            return Ok(Resolution::Roles(roles));
        }

        let user = match self.users.find_user_by_name(&identity.user_name).await? {
            Some(user) if user.is_available() => user,
            _ => return Ok(Resolution::Denied(DenyReason::UnknownUser)),
        };

        let roles: RoleSet = self
            .users
            .role_names_for_user(user.id)
            .await?
            .into_iter()
            .collect();
        self.cache
            .set_roles(&identity.user_name, &roles, Expiry::Never)
            .await?;
        Ok(Resolution::Roles(roles))
    }
}
