//! Shared fixtures: an application wired over in-memory stores

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use warden::config::{CacheConfig, Config, DatabaseConfig};
use warden::core::models::{DeleteMode, Page, Paged, Policy, Role, Tuple, User};
use warden::core::traits::{CacheBackend, DirectoryService, PermissionEngine, RoleStore};
use warden::storage::{CasbinEngine, Database, MemoryCache, MemoryDirectory};
use warden::utils::error::{Result, WardenError};
use warden::Warden;

pub const PASSWORD: &str = "s3cret-password";

pub struct TestApp {
    pub warden: Warden,
    pub cache: Arc<MemoryCache>,
    pub directory: Arc<MemoryDirectory>,
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.storage.database = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        ..DatabaseConfig::default()
    };
    config.storage.redis.enabled = false;
    config.cache = CacheConfig {
        invalidation_delay_ms: 50,
        ..CacheConfig::default()
    };
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config
}

pub async fn database() -> Arc<Database> {
    let database = Database::new(&test_config().storage.database)
        .await
        .expect("connect sqlite");
    database.migrate().await.expect("migrate");
    Arc::new(database)
}

/// Application with the directory mirror enabled
pub async fn setup() -> TestApp {
    build(test_config(), true).await
}

pub async fn setup_without_directory() -> TestApp {
    build(test_config(), false).await
}

/// Directory-mirrored application over a custom configuration
pub async fn setup_with_config(config: Config) -> TestApp {
    build(config, true).await
}

async fn build(config: Config, with_directory: bool) -> TestApp {
    let database = database().await;
    let cache = Arc::new(MemoryCache::default());
    let directory = Arc::new(MemoryDirectory::new());
    let engine = Arc::new(
        CasbinEngine::bootstrap(database.as_ref())
            .await
            .expect("engine"),
    );

    let mirror: Option<Arc<dyn DirectoryService>> = if with_directory {
        Some(directory.clone())
    } else {
        None
    };
    let cache_backend: Arc<dyn CacheBackend> = cache.clone();
    let warden = Warden::assemble(config, database, cache_backend, engine, mirror)
        .await
        .expect("assemble");

    TestApp {
        warden,
        cache,
        directory,
    }
}

impl TestApp {
    pub async fn policy(&self, name: &str, path: &str, method: &str) -> Policy {
        self.warden
            .policies
            .create_policy(name, path, method, "")
            .await
            .expect("create policy")
    }

    pub async fn role(&self, name: &str) -> Role {
        self.warden
            .roles
            .create_role(name, "")
            .await
            .expect("create role")
    }

    pub async fn user(&self, name: &str) -> User {
        self.warden
            .users
            .register_user(name, &format!("{}@example.com", name), PASSWORD)
            .await
            .expect("register user")
    }
}

/// Engine wrapper whose writes can be made to fail
pub struct FlakyEngine {
    inner: CasbinEngine,
    fail_writes: AtomicBool,
}

impl FlakyEngine {
    pub async fn new() -> Self {
        Self {
            inner: CasbinEngine::new().await.expect("engine"),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WardenError::engine("injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl PermissionEngine for FlakyEngine {
    async fn enforce(&self, subject: &str, object: &str, action: &str) -> Result<bool> {
        self.inner.enforce(subject, object, action).await
    }

    async fn add_tuples(&self, tuples: &[Tuple]) -> Result<()> {
        self.check()?;
        self.inner.add_tuples(tuples).await
    }

    async fn remove_tuples(&self, tuples: &[Tuple]) -> Result<()> {
        self.check()?;
        self.inner.remove_tuples(tuples).await
    }

    async fn tuples_for_subject(&self, subject: &str) -> Result<Vec<Tuple>> {
        self.inner.tuples_for_subject(subject).await
    }
}

/// Role store wrapper whose association removals can be made to fail
pub struct FlakyRoleStore {
    inner: Arc<Database>,
    fail_removals: AtomicBool,
}

impl FlakyRoleStore {
    pub fn new(inner: Arc<Database>) -> Self {
        Self {
            inner,
            fail_removals: AtomicBool::new(false),
        }
    }

    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RoleStore for FlakyRoleStore {
    async fn find_role_by_id(&self, id: i64) -> Result<Option<Role>> {
        self.inner.find_role_by_id(id).await
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.inner.find_role_by_name(name).await
    }

    async fn find_roles_by_names(&self, names: &[String]) -> Result<Vec<Role>> {
        self.inner.find_roles_by_names(names).await
    }

    async fn create_role(&self, role: &Role) -> Result<()> {
        self.inner.create_role(role).await
    }

    async fn update_role_description(&self, id: i64, description: &str) -> Result<()> {
        self.inner.update_role_description(id, description).await
    }

    async fn delete_role(&self, id: i64, mode: DeleteMode) -> Result<()> {
        self.inner.delete_role(id, mode).await
    }

    async fn list_roles(&self, page: Page) -> Result<Paged<Role>> {
        self.inner.list_roles(page).await
    }

    async fn users_of_role(&self, role_id: i64) -> Result<Vec<String>> {
        self.inner.users_of_role(role_id).await
    }

    async fn policies_of_role(&self, role_id: i64) -> Result<Vec<Policy>> {
        self.inner.policies_of_role(role_id).await
    }

    async fn append_role_policies(&self, role_id: i64, policy_ids: &[i64]) -> Result<()> {
        self.inner.append_role_policies(role_id, policy_ids).await
    }

    async fn remove_role_policies(&self, role_id: i64, policy_ids: &[i64]) -> Result<()> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(WardenError::Database(sea_orm::DbErr::Custom(
                "injected failure".to_string(),
            )));
        }
        self.inner.remove_role_policies(role_id, policy_ids).await
    }

    async fn all_role_tuples(&self) -> Result<Vec<Tuple>> {
        self.inner.all_role_tuples().await
    }
}

/// Fields of one captured event, values rendered as text
pub type EventFields = BTreeMap<String, String>;

/// Events captured on one log target
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<EventFields>>>);

impl CapturedEvents {
    pub fn all(&self) -> Vec<EventFields> {
        self.0.lock().clone()
    }
}

struct CaptureLayer {
    target: &'static str,
    events: CapturedEvents,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() != self.target {
            return;
        }
        let mut fields = FieldCollector::default();
        event.record(&mut fields);
        self.events.0.lock().push(fields.0);
    }
}

#[derive(Default)]
struct FieldCollector(EventFields);

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

/// Capture events on `target` for the current thread until the guard drops
///
/// Only reliable on the current-thread runtime `#[tokio::test]` uses.
pub fn capture_target(target: &'static str) -> (CapturedEvents, DefaultGuard) {
    let events = CapturedEvents::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        target,
        events: events.clone(),
    });
    (events, tracing::subscriber::set_default(subscriber))
}
