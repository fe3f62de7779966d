mod common;

use common::{PASSWORD, setup, setup_with_config, setup_without_directory, test_config};
use std::time::Duration;
use warden::core::models::{Page, RoleSet, UserProfile};
use warden::core::traits::{Expiry, PermissionEngine, RoleStore};
use warden::services::{SeedAdmin, seed};
use warden::utils::error::ErrorKind;

#[tokio::test]
async fn test_role_with_member_cannot_be_deleted() {
    let app = setup().await;
    let viewer = app.role("viewer").await;
    let reports = app.policy("reports", "/reports", "GET").await;
    app.warden.roles.grant_policies(viewer.id, &[reports.id]).await.unwrap();
    let alice = app.user("alice").await;
    app.warden
        .users
        .grant_roles(alice.id, &["viewer".to_string()])
        .await
        .unwrap();

    let err = app.warden.roles.delete_role(viewer.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("alice"));

    let detail = app.warden.roles.get_role(viewer.id).await.unwrap();
    assert_eq!(detail.policies.len(), 1);
    assert_eq!(detail.users, vec!["alice".to_string()]);
    assert!(app.warden.engine.enforce("viewer", "/reports", "GET").await.unwrap());
    assert_eq!(app.directory.members("viewer"), Some(vec!["alice".to_string()]));
}

#[tokio::test]
async fn test_role_delete_clears_every_store() {
    let app = setup().await;
    let viewer = app.role("viewer").await;
    let reports = app.policy("reports", "/reports", "GET").await;
    app.warden.roles.grant_policies(viewer.id, &[reports.id]).await.unwrap();
    assert_eq!(app.directory.group_names(), vec!["viewer".to_string()]);

    app.warden.roles.delete_role(viewer.id).await.unwrap();

    assert!(!app.warden.engine.enforce("viewer", "/reports", "GET").await.unwrap());
    assert!(app.directory.group_names().is_empty());
    assert!(app.warden.database.find_role_by_id(viewer.id).await.unwrap().is_none());
    // the policy itself survives and is free to delete
    app.warden.policies.delete_policy(reports.id).await.unwrap();
}

#[tokio::test]
async fn test_protected_role_cannot_be_deleted() {
    let app = setup().await;
    let admin = app.role("admin").await;
    let err = app.warden.roles.delete_role(admin.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_duplicate_role_is_a_conflict() {
    let app = setup_without_directory().await;
    app.role("viewer").await;
    let err = app.warden.roles.create_role("viewer", "again").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(app.warden.roles.list_roles(Page::default()).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_policy_rules() {
    let app = setup_without_directory().await;
    let policies = &app.warden.policies;

    let policy = policies.create_policy("reports", "/reports", "get", "").await.unwrap();
    assert_eq!(policy.method, "GET");

    let err = policies.create_policy("reports", "/reports", "GET", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let err = policies.create_policy("bad", "reports", "GET", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);
    let err = policies.create_policy("bad", "/reports", "FETCH", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Invalid);

    let viewer = app.role("viewer").await;
    app.warden.roles.grant_policies(viewer.id, &[policy.id]).await.unwrap();
    let err = policies.delete_policy(policy.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("viewer"));

    app.warden.roles.revoke_policies(viewer.id, &[policy.id]).await.unwrap();
    policies.delete_policy(policy.id).await.unwrap();
    assert_eq!(
        policies.get_policy(policy.id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_description_updates() {
    let app = setup_without_directory().await;
    let viewer = app.role("viewer").await;
    let updated = app
        .warden
        .roles
        .update_role_description(viewer.id, "Can read reports")
        .await
        .unwrap();
    assert_eq!(updated.description, "Can read reports");
    assert_eq!(
        app.warden.roles.get_role(viewer.id).await.unwrap().role.description,
        "Can read reports"
    );
}

#[tokio::test]
async fn test_registration_and_login() {
    let app = setup_without_directory().await;
    let users = &app.warden.users;
    let alice = app.user("alice").await;
    assert_ne!(alice.password_hash, PASSWORD);

    let err = users
        .register_user("alice", "other@example.com", PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let err = users
        .register_user("alice2", "alice@example.com", PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let token = users.login("alice@example.com", PASSWORD).await.unwrap();
    let claims = app.warden.jwt.verify_token(&token.access_token).unwrap();
    assert_eq!(claims.sub, alice.id);
    assert_eq!(
        app.warden.role_cache.get_roles("alice").await.unwrap(),
        Some(RoleSet::new())
    );

    for (email, password) in [
        ("alice@example.com", "wrong-password"),
        ("nobody@example.com", PASSWORD),
    ] {
        let err = users.login(email, password).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    }

    users.disable_user(alice.id).await.unwrap();
    let err = users.login("alice@example.com", PASSWORD).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
}

#[tokio::test]
async fn test_change_password_and_logout() {
    let app = setup_without_directory().await;
    let users = &app.warden.users;
    let bob = app.user("bob").await;

    let err = users
        .change_password(bob.id, "not-the-password", "new-password-1")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);

    users.change_password(bob.id, PASSWORD, "new-password-1").await.unwrap();
    users.login("bob@example.com", "new-password-1").await.unwrap();
    assert!(app.warden.role_cache.get_roles("bob").await.unwrap().is_some());

    users.logout(bob.id).await.unwrap();
    assert!(app.warden.role_cache.get_roles("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_role_grant_is_rejected() {
    let app = setup().await;
    app.role("viewer").await;
    let carol = app.user("carol").await;

    let err = app
        .warden
        .users
        .grant_roles(carol.id, &["viewer".to_string(), "auditor".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("auditor"));

    let (_, roles) = app.warden.users.get_user(carol.id).await.unwrap();
    assert!(roles.is_empty());
    assert_eq!(app.directory.members("viewer"), Some(vec![]));
}

#[tokio::test]
async fn test_delayed_invalidation_clears_stale_write() {
    let app = setup_without_directory().await;
    let viewer = app.role("viewer").await;
    let reports = app.policy("reports", "/reports", "GET").await;
    app.warden.roles.grant_policies(viewer.id, &[reports.id]).await.unwrap();
    let dave = app.user("dave").await;

    app.warden
        .users
        .grant_roles(dave.id, &["viewer".to_string()])
        .await
        .unwrap();

    // a reader that resolved before the grant writes back its stale view
    app.warden
        .role_cache
        .set_roles("dave", &RoleSet::new(), Expiry::Never)
        .await
        .unwrap();

    let delay = app.warden.role_cache.invalidation_delay();
    tokio::time::sleep(delay + Duration::from_millis(100)).await;
    assert_eq!(app.warden.role_cache.get_roles("dave").await.unwrap(), None);

    let verdict = app
        .warden
        .pipeline
        .resolve_and_authorize(
            &warden::core::models::Identity::new(dave.id, "dave"),
            "/reports",
            "GET",
        )
        .await;
    assert!(verdict.is_allowed());
}

#[tokio::test]
async fn test_seed_is_repeatable() {
    let app = setup().await;
    let admin = SeedAdmin {
        name: "admin".to_string(),
        email: "admin@example.com".to_string(),
        password: "admin-password".to_string(),
    };

    let first = seed(&app.warden, Some(&admin)).await.unwrap();
    assert_eq!(first.policies_created.len(), 2);
    assert_eq!(first.roles_created, vec!["admin".to_string(), "view".to_string()]);
    assert_eq!(first.admin_created.as_deref(), Some("admin"));

    let second = seed(&app.warden, Some(&admin)).await.unwrap();
    assert!(second.policies_created.is_empty());
    assert!(second.roles_created.is_empty());
    assert!(second.admin_created.is_none());

    let engine = &app.warden.engine;
    assert!(engine.enforce("admin", "/roles/1", "DELETE").await.unwrap());
    assert!(engine.enforce("view", "/roles", "GET").await.unwrap());
    assert!(!engine.enforce("view", "/roles", "POST").await.unwrap());
    assert_eq!(app.directory.members("admin"), Some(vec!["admin".to_string()]));

    let token = app
        .warden
        .users
        .login("admin@example.com", "admin-password")
        .await
        .unwrap();
    let claims = app.warden.jwt.verify_token(&token.access_token).unwrap();
    let verdict = app
        .warden
        .pipeline
        .resolve_and_authorize(
            &warden::core::models::Identity::new(claims.sub, claims.name),
            "/users/7/disable",
            "POST",
        )
        .await;
    assert!(verdict.is_allowed());
}

#[tokio::test]
async fn test_seed_when_view_is_the_protected_role() {
    let mut config = test_config();
    config.auth.protected_role = "view".to_string();
    let app = setup_with_config(config).await;

    let report = seed(&app.warden, None).await.unwrap();
    assert_eq!(report.roles_created, vec!["view".to_string()]);

    let engine = &app.warden.engine;
    assert!(engine.enforce("view", "/roles/1", "DELETE").await.unwrap());
    assert!(engine.enforce("view", "/roles", "GET").await.unwrap());

    seed(&app.warden, None).await.unwrap();
}

#[tokio::test]
async fn test_disabled_user_cannot_gain_roles() {
    let app = setup().await;
    app.role("viewer").await;
    let bob = app.user("bob").await;
    let users = &app.warden.users;

    users.disable_user(bob.id).await.unwrap();
    let err = users
        .grant_roles(bob.id, &["viewer".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let (_, roles) = users.get_user(bob.id).await.unwrap();
    assert!(roles.is_empty());
    assert_eq!(app.directory.members("viewer"), Some(vec![]));
    assert!(app.directory.user("bob").is_none());

    users.enable_user(bob.id).await.unwrap();
    users.grant_roles(bob.id, &["viewer".to_string()]).await.unwrap();
    assert_eq!(app.directory.members("viewer"), Some(vec!["bob".to_string()]));
}

#[tokio::test]
async fn test_directory_user_follows_account() {
    let app = setup().await;
    app.role("viewer").await;
    let erin = app.user("erin").await;
    let users = &app.warden.users;

    let entry = app.directory.user("erin").unwrap();
    assert_eq!(entry.email, "erin@example.com");
    let hash = entry.password_hash.unwrap();
    assert!(hash.starts_with("{SSHA}"));
    assert!(warden::auth::verify_ssha(PASSWORD, &hash));

    users.change_password(erin.id, PASSWORD, "rotated-password").await.unwrap();
    let hash = app.directory.user("erin").unwrap().password_hash.unwrap();
    assert!(warden::auth::verify_ssha("rotated-password", &hash));

    users.grant_roles(erin.id, &["viewer".to_string()]).await.unwrap();
    users.disable_user(erin.id).await.unwrap();
    assert!(app.directory.user("erin").is_none());
    assert_eq!(app.directory.members("viewer"), Some(vec![]));

    let err = users
        .change_password(erin.id, "rotated-password", "another-password")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // restored without a password until the next change
    users.enable_user(erin.id).await.unwrap();
    assert_eq!(app.directory.user("erin").unwrap().password_hash, None);
    assert_eq!(app.directory.members("viewer"), Some(vec!["erin".to_string()]));
}

#[tokio::test]
async fn test_profile_and_info() {
    let app = setup().await;
    let viewer = app.role("viewer").await;
    let reports = app.policy("reports", "/reports", "GET").await;
    let exports = app.policy("exports", "/exports", "GET").await;
    app.warden
        .roles
        .grant_policies(viewer.id, &[reports.id, exports.id])
        .await
        .unwrap();
    let fay = app.user("fay").await;
    let users = &app.warden.users;
    users.grant_roles(fay.id, &["viewer".to_string()]).await.unwrap();

    let updated = users
        .update_profile(
            fay.id,
            &UserProfile {
                nickname: Some("Fay".to_string()),
                mobile: None,
                avatar: Some("https://example.com/fay.png".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.nickname, "Fay");
    assert_eq!(updated.avatar, "https://example.com/fay.png");
    assert_eq!(updated.mobile, "");

    let info = users.info(fay.id).await.unwrap();
    assert_eq!(info.user.nickname, "Fay");
    assert_eq!(info.roles, vec!["viewer".to_string()]);
    let mut paths: Vec<&str> = info.policies.iter().map(|p| p.path.as_str()).collect();
    paths.sort();
    assert_eq!(paths, vec!["/exports", "/reports"]);

    users.disable_user(fay.id).await.unwrap();
    let err = users.info(fay.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
