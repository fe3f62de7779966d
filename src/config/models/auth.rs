//! Authentication configuration

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: u64,
    /// Token issuer claim
    #[serde(default = "default_jwt_issuer")]
    pub jwt_issuer: String,
    /// Role whose policy associations can never be changed
    #[serde(default = "default_protected_role")]
    pub protected_role: String,
    /// Route prefixes that bypass authorization
    #[serde(default = "default_public_routes")]
    pub public_routes: Vec<String>,
    /// Routes that need a valid token for an available user but no role
    #[serde(default = "default_authenticated_routes")]
    pub authenticated_routes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_expiration: default_jwt_expiration(),
            jwt_issuer: default_jwt_issuer(),
            protected_role: default_protected_role(),
            public_routes: default_public_routes(),
            authenticated_routes: default_authenticated_routes(),
        }
    }
}

impl AuthConfig {
    /// Whether the path is reachable without a token
    pub fn is_public_route(&self, path: &str) -> bool {
        matches_any(&self.public_routes, path)
    }

    /// Whether the path skips role evaluation once the caller is authenticated
    pub fn is_authenticated_route(&self, path: &str) -> bool {
        matches_any(&self.authenticated_routes, path)
    }
}

fn matches_any(routes: &[String], path: &str) -> bool {
    routes
        .iter()
        .any(|route| path == route || path.starts_with(&format!("{}/", route)))
}

pub(crate) fn default_jwt_secret() -> String {
    "change-me".to_string()
}

fn default_jwt_expiration() -> u64 {
    86400
}

fn default_jwt_issuer() -> String {
    "warden".to_string()
}

fn default_protected_role() -> String {
    "admin".to_string()
}

fn default_public_routes() -> Vec<String> {
    vec![
        "/health".to_string(),
        "/auth/login".to_string(),
        "/auth/register".to_string(),
    ]
}

fn default_authenticated_routes() -> Vec<String> {
    ["/auth/logout", "/auth/password", "/auth/profile", "/auth/info"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Warn about configuration that works but should not reach production
pub fn warn_insecure_config(config: &AuthConfig) {
    if config.jwt_expiration > 7 * 86400 {
        warn!(
            "JWT expiration of {}s is longer than a week",
            config.jwt_expiration
        );
    }
    if config.public_routes.iter().any(|r| r == "/") {
        warn!("Public routes include '/', authorization is effectively disabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_route_matching() {
        let config = AuthConfig::default();
        assert!(config.is_public_route("/health"));
        assert!(config.is_public_route("/auth/login"));
        assert!(!config.is_public_route("/healthz"));
        assert!(!config.is_public_route("/roles"));
        assert!(config.is_public_route("/auth/register"));
    }

    #[test]
    fn test_authenticated_route_matching() {
        let config = AuthConfig::default();
        for path in ["/auth/logout", "/auth/password", "/auth/profile", "/auth/info"] {
            assert!(config.is_authenticated_route(path), "{}", path);
            assert!(!config.is_public_route(path), "{}", path);
        }
        assert!(!config.is_authenticated_route("/users"));
        assert!(!config.is_authenticated_route("/auth/login"));
    }
}
