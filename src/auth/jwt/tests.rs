use super::*;
use crate::config::AuthConfig;
use crate::core::traits::IdentityExtractor;
use crate::utils::error::ErrorKind;

fn handler() -> JwtHandler {
    JwtHandler::new(&AuthConfig {
        jwt_secret: "test-secret-with-enough-length".to_string(),
        ..AuthConfig::default()
    })
}

#[test]
fn test_issue_and_verify() {
    let handler = handler();
    let token = handler.issue_token(42, "alice").unwrap();
    assert_eq!(token.token_type, "Bearer");

    let claims = handler.verify_token(&token.access_token).unwrap();
    assert_eq!(claims.sub, 42);
    assert_eq!(claims.name, "alice");
    assert_eq!(claims.iss, "warden");
}

#[test]
fn test_foreign_secret_rejected() {
    let token = handler().issue_token(1, "bob").unwrap();
    let other = JwtHandler::new(&AuthConfig {
        jwt_secret: "another-secret-entirely".to_string(),
        ..AuthConfig::default()
    });
    assert!(other.verify_token(&token.access_token).is_err());
}

#[tokio::test]
async fn test_extract_identity() {
    let handler = handler();
    let token = handler.issue_token(7, "carol").unwrap();
    let header = format!("Bearer {}", token.access_token);

    let identity = handler.extract(Some(&header)).await.unwrap();
    assert_eq!(identity.user_id, 7);
    assert_eq!(identity.user_name, "carol");
}

#[tokio::test]
async fn test_extract_rejects_bad_headers() {
    let handler = handler();
    for header in [None, Some("Basic abc"), Some("Bearer "), Some("Bearer not.a.jwt")] {
        let err = handler.extract(header).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    }
}

#[test]
fn test_debug_redacts_keys() {
    let debug = format!("{:?}", handler());
    assert!(debug.contains("[REDACTED]"));
    assert!(!debug.contains("test-secret"));
}
