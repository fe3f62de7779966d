//! Error type definitions

use thiserror::Error;

/// Result type alias for warden
pub type Result<T> = std::result::Result<T, WardenError>;

/// Main error type for warden
#[derive(Error, Debug)]
pub enum WardenError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Redis errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Cache backend errors that are not Redis protocol errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Permission-decision engine errors
    #[error("Engine error: {0}")]
    Engine(String),

    /// Directory service errors
    #[error("Directory error: {0}")]
    Directory(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Missing or malformed credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No role grants the requested action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate names and in-use resources
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Machine-lease or clock range exhausted
    #[error("Exhausted: {0}")]
    Exhaustion(String),

    /// Password hashing errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Coarse error classification exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthenticationFailure,
    AuthorizationDenied,
    NotFound,
    Conflict,
    DependencyFailure,
    Exhaustion,
    Invalid,
    Internal,
}

impl WardenError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WardenError::Unauthorized(_) | WardenError::Jwt(_) => ErrorKind::AuthenticationFailure,
            WardenError::Forbidden(_) => ErrorKind::AuthorizationDenied,
            WardenError::NotFound(_) => ErrorKind::NotFound,
            WardenError::Conflict(_) => ErrorKind::Conflict,
            WardenError::Database(_)
            | WardenError::Redis(_)
            | WardenError::Cache(_)
            | WardenError::Engine(_)
            | WardenError::Directory(_) => ErrorKind::DependencyFailure,
            WardenError::Exhaustion(_) => ErrorKind::Exhaustion,
            WardenError::Validation(_) => ErrorKind::Invalid,
            WardenError::Config(_)
            | WardenError::Serialization(_)
            | WardenError::Yaml(_)
            | WardenError::Io(_)
            | WardenError::Crypto(_)
            | WardenError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether a downstream store, cache, engine or directory call failed
    pub fn is_dependency_failure(&self) -> bool {
        self.kind() == ErrorKind::DependencyFailure
    }
}

impl From<casbin::Error> for WardenError {
    fn from(err: casbin::Error) -> Self {
        WardenError::Engine(err.to_string())
    }
}

#[cfg(feature = "ldap")]
impl From<ldap3::LdapError> for WardenError {
    fn from(err: ldap3::LdapError) -> Self {
        WardenError::Directory(err.to_string())
    }
}
