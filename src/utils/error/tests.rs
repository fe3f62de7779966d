//! Tests for error handling

use super::types::{ErrorKind, WardenError};
use actix_web::ResponseError;
use actix_web::http::StatusCode;

#[test]
fn test_error_creation() {
    let error = WardenError::unauthorized("missing bearer token");
    assert!(matches!(error, WardenError::Unauthorized(_)));

    let error = WardenError::conflict("role has users");
    assert!(matches!(error, WardenError::Conflict(msg) if msg == "role has users"));
}

#[test]
fn test_kind_taxonomy() {
    assert_eq!(
        WardenError::unauthorized("x").kind(),
        ErrorKind::AuthenticationFailure
    );
    assert_eq!(
        WardenError::forbidden("x").kind(),
        ErrorKind::AuthorizationDenied
    );
    assert_eq!(WardenError::not_found("x").kind(), ErrorKind::NotFound);
    assert_eq!(WardenError::conflict("x").kind(), ErrorKind::Conflict);
    assert_eq!(WardenError::exhaustion("x").kind(), ErrorKind::Exhaustion);
    assert_eq!(WardenError::engine("x").kind(), ErrorKind::DependencyFailure);
    assert_eq!(
        WardenError::directory("x").kind(),
        ErrorKind::DependencyFailure
    );
    assert_eq!(WardenError::cache("x").kind(), ErrorKind::DependencyFailure);
    assert_eq!(WardenError::validation("x").kind(), ErrorKind::Invalid);
}

#[test]
fn test_dependency_failure_flag() {
    assert!(WardenError::engine("enforcer poisoned").is_dependency_failure());
    assert!(!WardenError::not_found("role 1").is_dependency_failure());
}

#[test]
fn test_status_codes() {
    assert_eq!(
        WardenError::unauthorized("x").status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        WardenError::forbidden("x").status_code(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        WardenError::conflict("x").status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        WardenError::directory("x").status_code(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        WardenError::exhaustion("x").status_code(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}
