//! Validation tests

use super::Validate;
use crate::config::models::*;

fn valid_auth() -> AuthConfig {
    AuthConfig {
        jwt_secret: "Another-Strong-Secret-For-Testing-42".to_string(),
        ..AuthConfig::default()
    }
}

#[test]
fn test_server_port_zero() {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_auth_short_secret() {
    let config = AuthConfig {
        jwt_secret: "short".to_string(),
        ..AuthConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.contains("32 characters"));
}

#[test]
fn test_auth_valid() {
    assert!(valid_auth().validate().is_ok());
}

#[test]
fn test_auth_public_route_without_slash() {
    let mut config = valid_auth();
    config.public_routes.push("health".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_auth_authenticated_route_without_slash() {
    let mut config = valid_auth();
    config.authenticated_routes.push("auth/info".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_database_scheme() {
    let mut config = DatabaseConfig::default();
    assert!(config.validate().is_ok());

    config.url = "mysql://localhost/warden".to_string();
    assert!(config.validate().is_err());

    config.url = "postgres://localhost/warden".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_redis_disabled_skips_checks() {
    let config = RedisConfig {
        enabled: false,
        url: String::new(),
        ..RedisConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_redis_bad_scheme() {
    let config = RedisConfig {
        url: "http://localhost".to_string(),
        ..RedisConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_cache_zero_delay() {
    let config = CacheConfig {
        invalidation_delay_ms: 0,
        ..CacheConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_id_future_epoch() {
    let config = IdConfig {
        epoch: chrono::Utc::now().timestamp_millis() + 86_400_000,
        ..IdConfig::default()
    };
    assert!(config.validate().is_err());
    assert!(IdConfig::default().validate().is_ok());
}

#[test]
fn test_directory_disabled_is_always_valid() {
    let config = DirectoryConfig {
        url: "nonsense".to_string(),
        ..DirectoryConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_directory_bad_url() {
    let config = DirectoryConfig {
        enabled: true,
        url: "http://ldap".to_string(),
        ..DirectoryConfig::default()
    };
    assert!(config.validate().is_err());
}
