mod common;

use async_trait::async_trait;
use common::{PASSWORD, capture_target, setup};
use std::sync::Arc;
use warden::core::models::{Identity, RoleSet};
use warden::core::traits::{CacheBackend, Expiry};
use warden::utils::error::{Result, WardenError};
use warden::{AuthorizationPipeline, DenyReason, RoleCache, Verdict};

fn identity_of(user: &warden::core::models::User) -> Identity {
    Identity::new(user.id, &user.name)
}

#[tokio::test]
async fn test_grant_flows_through_to_verdict() {
    let app = setup().await;
    let viewer = app.role("viewer").await;
    let reports = app.policy("reports", "/reports", "GET").await;
    app.warden.roles.grant_policies(viewer.id, &[reports.id]).await.unwrap();

    let alice = app.user("alice").await;
    let identity = identity_of(&alice);
    let pipeline = &app.warden.pipeline;

    let verdict = pipeline.resolve_and_authorize(&identity, "/reports", "GET").await;
    assert_eq!(verdict, Verdict::Deny(DenyReason::NoRole));
    assert_eq!(verdict.status_code(), 403);
    assert_eq!(
        app.warden.role_cache.get_roles("alice").await.unwrap(),
        Some(RoleSet::new())
    );

    app.warden
        .users
        .grant_roles(alice.id, &["viewer".to_string()])
        .await
        .unwrap();
    assert_eq!(app.warden.role_cache.get_roles("alice").await.unwrap(), None);

    let verdict = pipeline.resolve_and_authorize(&identity, "/reports", "GET").await;
    assert_eq!(
        verdict,
        Verdict::Allow {
            role: "viewer".to_string()
        }
    );
    let cached = app.warden.role_cache.get_roles("alice").await.unwrap().unwrap();
    assert!(cached.contains("viewer"));
    assert_eq!(app.directory.members("viewer"), Some(vec!["alice".to_string()]));
}

#[tokio::test]
async fn test_action_not_granted_is_denied() {
    let app = setup().await;
    let viewer = app.role("viewer").await;
    let reports = app.policy("reports", "/reports", "GET").await;
    app.warden.roles.grant_policies(viewer.id, &[reports.id]).await.unwrap();
    let bob = app.user("bob").await;
    app.warden
        .users
        .grant_roles(bob.id, &["viewer".to_string()])
        .await
        .unwrap();

    let verdict = app
        .warden
        .pipeline
        .resolve_and_authorize(&identity_of(&bob), "/reports", "POST")
        .await;
    assert_eq!(verdict, Verdict::Deny(DenyReason::NotPermitted));
}

#[tokio::test]
async fn test_denials_are_audited() {
    let app = setup().await;
    let viewer = app.role("viewer").await;
    let reports = app.policy("reports", "/reports", "GET").await;
    app.warden.roles.grant_policies(viewer.id, &[reports.id]).await.unwrap();
    let dave = app.user("dave").await;
    let erin = app.user("erin").await;
    app.warden
        .users
        .grant_roles(erin.id, &["viewer".to_string()])
        .await
        .unwrap();

    let (events, _guard) = capture_target("warden::audit");
    let pipeline = &app.warden.pipeline;
    pipeline.resolve_and_authorize(&identity_of(&dave), "/reports", "GET").await;
    pipeline.resolve_and_authorize(&identity_of(&erin), "/reports", "DELETE").await;
    pipeline.resolve_and_authorize(&identity_of(&erin), "/reports", "GET").await;

    let events = events.all();
    assert_eq!(events.len(), 2);

    let no_role = &events[0];
    assert_eq!(no_role["user"], "dave");
    assert_eq!(no_role["roles"], "");
    assert_eq!(no_role["path"], "/reports");
    assert_eq!(no_role["method"], "GET");
    assert!(no_role["message"].contains("no role"));

    let not_permitted = &events[1];
    assert_eq!(not_permitted["user"], "erin");
    assert_eq!(not_permitted["roles"], "viewer");
    assert_eq!(not_permitted["path"], "/reports");
    assert_eq!(not_permitted["method"], "DELETE");
    assert!(not_permitted["message"].contains("not permitted"));
}

#[tokio::test]
async fn test_path_patterns_match_concrete_paths() {
    let app = setup().await;
    let reader = app.role("reader").await;
    let report = app.policy("report", "/reports/:id", "GET").await;
    app.warden.roles.grant_policies(reader.id, &[report.id]).await.unwrap();
    let carol = app.user("carol").await;
    app.warden
        .users
        .grant_roles(carol.id, &["reader".to_string()])
        .await
        .unwrap();

    let pipeline = &app.warden.pipeline;
    let identity = identity_of(&carol);
    assert!(pipeline.resolve_and_authorize(&identity, "/reports/42", "GET").await.is_allowed());
    assert!(!pipeline.resolve_and_authorize(&identity, "/reports/42/raw", "GET").await.is_allowed());
}

#[tokio::test]
async fn test_unknown_and_disabled_users_are_denied() {
    let app = setup().await;
    let pipeline = &app.warden.pipeline;

    let ghost = Identity::new(1, "ghost");
    let verdict = pipeline.resolve_and_authorize(&ghost, "/reports", "GET").await;
    assert_eq!(verdict, Verdict::Deny(DenyReason::UnknownUser));
    assert_eq!(app.warden.role_cache.get_roles("ghost").await.unwrap(), None);

    let viewer = app.role("viewer").await;
    let reports = app.policy("reports", "/reports", "GET").await;
    app.warden.roles.grant_policies(viewer.id, &[reports.id]).await.unwrap();
    let dave = app.user("dave").await;
    app.warden
        .users
        .grant_roles(dave.id, &["viewer".to_string()])
        .await
        .unwrap();
    assert!(
        pipeline
            .resolve_and_authorize(&identity_of(&dave), "/reports", "GET")
            .await
            .is_allowed()
    );

    app.warden.users.disable_user(dave.id).await.unwrap();
    let verdict = pipeline
        .resolve_and_authorize(&identity_of(&dave), "/reports", "GET")
        .await;
    assert_eq!(verdict, Verdict::Deny(DenyReason::UnknownUser));
    assert_eq!(app.directory.members("viewer"), Some(vec![]));

    app.warden.users.enable_user(dave.id).await.unwrap();
    assert!(
        pipeline
            .resolve_and_authorize(&identity_of(&dave), "/reports", "GET")
            .await
            .is_allowed()
    );
}

#[tokio::test]
async fn test_revoked_role_stops_authorizing() {
    let app = setup().await;
    let viewer = app.role("viewer").await;
    let reports = app.policy("reports", "/reports", "GET").await;
    app.warden.roles.grant_policies(viewer.id, &[reports.id]).await.unwrap();
    let erin = app.user("erin").await;
    let roles = vec!["viewer".to_string()];
    app.warden.users.grant_roles(erin.id, &roles).await.unwrap();

    let pipeline = &app.warden.pipeline;
    let identity = identity_of(&erin);
    assert!(pipeline.resolve_and_authorize(&identity, "/reports", "GET").await.is_allowed());

    app.warden.users.revoke_roles(erin.id, &roles).await.unwrap();
    let verdict = pipeline.resolve_and_authorize(&identity, "/reports", "GET").await;
    assert_eq!(verdict, Verdict::Deny(DenyReason::NoRole));
}

#[tokio::test]
async fn test_token_is_required() {
    let app = setup().await;
    let frank = app.user("frank").await;
    let pipeline = &app.warden.pipeline;
    let jwt = app.warden.jwt.as_ref();

    let (identity, verdict) = pipeline.authorize_request(jwt, None, "/reports", "GET").await;
    assert!(identity.is_none());
    assert_eq!(verdict.status_code(), 401);

    let token = app
        .warden
        .users
        .login("frank@example.com", PASSWORD)
        .await
        .unwrap();
    let header = format!("Bearer {}", token.access_token);
    let (identity, verdict) = pipeline
        .authorize_request(jwt, Some(&header), "/reports", "GET")
        .await;
    assert_eq!(identity, Some(Identity::new(frank.id, "frank")));
    assert_eq!(verdict, Verdict::Deny(DenyReason::NoRole));
}

struct BrokenCache;

#[async_trait]
impl CacheBackend for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(WardenError::cache("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &str, _expiry: Expiry) -> Result<()> {
        Err(WardenError::cache("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(WardenError::cache("connection refused"))
    }

    async fn incr(&self, _key: &str) -> Result<i64> {
        Err(WardenError::cache("connection refused"))
    }

    async fn health_check(&self) -> Result<()> {
        Err(WardenError::cache("connection refused"))
    }
}

#[tokio::test]
async fn test_dependency_failure_fails_closed() {
    let app = setup().await;
    let cache = Arc::new(RoleCache::new(
        Arc::new(BrokenCache),
        &app.warden.config.cache,
    ));
    let pipeline = AuthorizationPipeline::new(
        cache,
        app.warden.database.clone(),
        app.warden.engine.clone(),
    );

    let grace = app.user("grace").await;
    let verdict = pipeline
        .resolve_and_authorize(&identity_of(&grace), "/anything", "GET")
        .await;
    assert_eq!(verdict, Verdict::Deny(DenyReason::DependencyFailure));
    assert_eq!(verdict.status_code(), 403);
}
