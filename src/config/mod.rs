//! Configuration management for warden
//!
//! Configuration is loaded once at startup, validated, and then shared
//! read-only (behind an `Arc`) with every component that needs it.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{Result, WardenError};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for warden
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// HTTP server and logging
    #[serde(default)]
    pub server: ServerConfig,
    /// Token issuing and route protection
    #[serde(default)]
    pub auth: AuthConfig,
    /// Relational store and cache tier
    #[serde(default)]
    pub storage: StorageConfig,
    /// Role-cache behaviour
    #[serde(default)]
    pub cache: CacheConfig,
    /// Identifier allocation
    #[serde(default)]
    pub id: IdConfig,
    /// External directory mirror
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| WardenError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides();
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse configuration from a YAML document without validating it
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| WardenError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Override secrets and endpoints from `WARDEN_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("WARDEN_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(url) = std::env::var("WARDEN_DATABASE_URL") {
            self.storage.database.url = url;
        }
        if let Ok(url) = std::env::var("WARDEN_REDIS_URL") {
            self.storage.redis.url = url;
        }
        if let Ok(password) = std::env::var("WARDEN_DIRECTORY_PASSWORD") {
            self.directory.root_password = password;
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.server
            .validate()
            .map_err(|e| WardenError::Config(format!("Server config error: {}", e)))?;
        self.auth
            .validate()
            .map_err(|e| WardenError::Config(format!("Auth config error: {}", e)))?;
        self.storage
            .validate()
            .map_err(|e| WardenError::Config(format!("Storage config error: {}", e)))?;
        self.cache
            .validate()
            .map_err(|e| WardenError::Config(format!("Cache config error: {}", e)))?;
        self.id
            .validate()
            .map_err(|e| WardenError::Config(format!("Id config error: {}", e)))?;
        self.directory
            .validate()
            .map_err(|e| WardenError::Config(format!("Directory config error: {}", e)))?;

        crate::config::models::auth::warn_insecure_config(&self.auth);

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| WardenError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_yaml() -> &'static str {
        r#"
server:
  port: 9090
auth:
  jwt_secret: "Test-Secret-Key-With-Enough-Length-123"
storage:
  database:
    url: "sqlite::memory:"
  redis:
    enabled: false
"#
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = Config::from_yaml(valid_yaml()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cache.role_key_prefix, "role");
        assert_eq!(config.cache.invalidation_delay_ms, 200);
        assert_eq!(config.id.machine_lease_key, "machine_id");
        assert_eq!(config.auth.protected_role, "admin");
        assert!(!config.directory.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_rejects_placeholder_secret() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = Config::from_yaml("server: [not, a, map");
        assert!(matches!(result, Err(WardenError::Config(_))));
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(valid_yaml().as_bytes()).unwrap();

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.database.url, "sqlite::memory:");
    }

    #[tokio::test]
    async fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(dir.path().join("absent.yaml")).await;
        assert!(matches!(result, Err(WardenError::Config(_))));
    }

    #[test]
    fn test_yaml_roundtrip_keeps_directory_section() {
        let mut config = Config::from_yaml(valid_yaml()).unwrap();
        config.directory.enabled = true;
        let yaml = config.to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert!(parsed.directory.enabled);
        assert_eq!(parsed.directory.group_base, config.directory.group_base);
    }
}
