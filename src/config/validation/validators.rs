//! Validators for every configuration section

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }
        if self.log_level.is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long".to_string());
        }
        if self.jwt_secret == default_jwt_secret() {
            return Err("JWT secret must not use the default value".to_string());
        }
        if self.jwt_expiration < 60 {
            return Err("JWT expiration should be at least 60 seconds".to_string());
        }
        if self.jwt_issuer.is_empty() {
            return Err("JWT issuer cannot be empty".to_string());
        }
        if self.protected_role.is_empty() {
            return Err("Protected role name cannot be empty".to_string());
        }
        if let Some(route) = self.public_routes.iter().find(|r| !r.starts_with('/')) {
            return Err(format!("Public route '{}' must start with '/'", route));
        }
        if let Some(route) = self
            .authenticated_routes
            .iter()
            .find(|r| !r.starts_with('/'))
        {
            return Err(format!("Authenticated route '{}' must start with '/'", route));
        }
        Ok(())
    }
}

impl Validate for StorageConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating storage configuration");

        self.database.validate()?;
        self.redis.validate()?;
        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        let supported = ["sqlite:", "postgres://", "postgresql://"];
        if !supported.iter().any(|scheme| self.url.starts_with(scheme)) {
            return Err("Only SQLite and PostgreSQL databases are supported".to_string());
        }

        if self.max_connections == 0 {
            return Err("Database max connections must be greater than 0".to_string());
        }

        if self.connection_timeout == 0 {
            return Err("Database connection timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if self.url.is_empty() {
            return Err("Redis URL cannot be empty".to_string());
        }

        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err("Redis URL must start with redis:// or rediss://".to_string());
        }

        if self.default_ttl == 0 {
            return Err("Redis default TTL must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.role_key_prefix.is_empty() {
            return Err("Role key prefix cannot be empty".to_string());
        }
        if self.invalidation_delay_ms == 0 {
            return Err("Invalidation delay must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for IdConfig {
    fn validate(&self) -> Result<(), String> {
        if self.machine_lease_key.is_empty() {
            return Err("Machine lease key cannot be empty".to_string());
        }
        if self.epoch < 0 {
            return Err("Epoch must not be before 1970".to_string());
        }
        if self.epoch > chrono::Utc::now().timestamp_millis() {
            return Err("Epoch must not be in the future".to_string());
        }
        Ok(())
    }
}

impl Validate for DirectoryConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        if !self.url.starts_with("ldap://") && !self.url.starts_with("ldaps://") {
            return Err("Directory URL must start with ldap:// or ldaps://".to_string());
        }
        if self.root_dn.is_empty() {
            return Err("Directory root DN cannot be empty".to_string());
        }
        if self.user_base.is_empty() || self.group_base.is_empty() {
            return Err("Directory user and group bases cannot be empty".to_string());
        }
        if cfg!(not(feature = "ldap")) {
            return Err("Directory is enabled but warden was built without the ldap feature".to_string());
        }
        Ok(())
    }
}
