//! # Warden
//!
//! Role-based access control backend. Users hold roles, roles hold
//! (path, method) policies, and every request is authorized against the
//! current mapping.
//!
//! ## Components
//!
//! - **ID allocator**: time-ordered 63-bit ids with a machine lease taken
//!   from a shared counter
//! - **Role cache**: cache-aside user→roles map with two-phase invalidation
//! - **Association sync**: keeps the Casbin tuple set equal to the relational
//!   role/policy graph
//! - **Directory mirror**: optional LDAP replication of roles and members
//! - **Authorization pipeline**: identity → roles → engine verdict
//!
//! ## Running
//!
//! ```rust,no_run
//! use warden::{Config, Warden};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/warden.yaml").await?;
//!     let warden = Warden::new(config).await?;
//!     warden.run().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use core::authz::{AuthorizationPipeline, DenyReason, Verdict};
pub use core::cache::RoleCache;
pub use core::id::IdAllocator;
pub use core::mirror::DirectoryMirror;
pub use core::sync::AssociationSync;
pub use utils::error::{Result, WardenError};

use crate::auth::JwtHandler;
use crate::core::traits::{CacheBackend, DirectoryService, PermissionEngine};
use crate::services::{PolicyService, RoleService, UserService};
use crate::storage::{CasbinEngine, Database, MemoryCache, RedisPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Fully wired application
///
/// Every component receives its collaborators through its constructor; the
/// configuration is read once here and never mutated.
pub struct Warden {
    pub config: Arc<Config>,
    pub database: Arc<Database>,
    pub cache_backend: Arc<dyn CacheBackend>,
    pub engine: Arc<CasbinEngine>,
    pub ids: Arc<IdAllocator>,
    pub role_cache: Arc<RoleCache>,
    pub sync: Arc<AssociationSync>,
    pub mirror: DirectoryMirror,
    pub jwt: Arc<JwtHandler>,
    pub pipeline: Arc<AuthorizationPipeline>,
    pub roles: Arc<RoleService>,
    pub policies: Arc<PolicyService>,
    pub users: Arc<UserService>,
}

impl Warden {
    /// Connect every store and build the components
    ///
    /// Fails when any store is unreachable or the machine lease is invalid.
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating warden instance");

        let database = Database::new(&config.storage.database).await?;
        database.migrate().await?;
        let database = Arc::new(database);

        let cache_backend: Arc<dyn CacheBackend> = if config.storage.redis.enabled {
            Arc::new(RedisPool::new(&config.storage.redis).await?)
        } else {
            warn!("Redis disabled, using the in-process cache; machine leases are not shared");
            Arc::new(MemoryCache::new(Duration::from_secs(
                config.storage.redis.default_ttl,
            )))
        };

        let engine = Arc::new(CasbinEngine::bootstrap(database.as_ref()).await?);

        let directory = directory_from_config(&config)?;
        Self::assemble(config, database, cache_backend, engine, directory).await
    }

    /// Build the components over already connected stores
    pub async fn assemble(
        config: Config,
        database: Arc<Database>,
        cache_backend: Arc<dyn CacheBackend>,
        engine: Arc<CasbinEngine>,
        directory: Option<Arc<dyn DirectoryService>>,
    ) -> Result<Self> {
        let config = Arc::new(config);
        let ids = Arc::new(
            IdAllocator::lease(
                cache_backend.as_ref(),
                &config.id.machine_lease_key,
                config.id.epoch,
            )
            .await?,
        );

        let role_cache = Arc::new(RoleCache::new(cache_backend.clone(), &config.cache));
        let engine_dyn: Arc<dyn PermissionEngine> = engine.clone();
        let sync = Arc::new(AssociationSync::new(
            database.clone(),
            database.clone(),
            engine_dyn.clone(),
            config.auth.protected_role.clone(),
        ));
        let mirror = match directory {
            Some(directory) => DirectoryMirror::enabled(directory),
            None => DirectoryMirror::disabled(),
        };
        let jwt = Arc::new(JwtHandler::new(&config.auth));
        let pipeline = Arc::new(AuthorizationPipeline::new(
            role_cache.clone(),
            database.clone(),
            engine_dyn,
        ));

        let roles = Arc::new(RoleService::new(
            database.clone(),
            ids.clone(),
            sync.clone(),
            mirror.clone(),
        ));
        let policies = Arc::new(PolicyService::new(database.clone(), ids.clone()));
        let users = Arc::new(UserService::new(
            database.clone(),
            database.clone(),
            ids.clone(),
            role_cache.clone(),
            mirror.clone(),
            jwt.clone(),
        ));

        Ok(Self {
            config,
            database,
            cache_backend,
            engine,
            ids,
            role_cache,
            sync,
            mirror,
            jwt,
            pipeline,
            roles,
            policies,
            users,
        })
    }

    /// Serve HTTP until shutdown
    pub async fn run(self) -> Result<()> {
        info!("Starting warden");
        server::HttpServer::new(Arc::new(self)).start().await
    }
}

#[cfg(feature = "ldap")]
fn directory_from_config(config: &Config) -> Result<Option<Arc<dyn DirectoryService>>> {
    if !config.directory.enabled {
        return Ok(None);
    }
    info!("Directory mirror enabled: {}", config.directory.url);
    Ok(Some(Arc::new(storage::LdapDirectory::new(&config.directory))))
}

#[cfg(not(feature = "ldap"))]
fn directory_from_config(config: &Config) -> Result<Option<Arc<dyn DirectoryService>>> {
    if config.directory.enabled {
        return Err(WardenError::config(
            "directory.enabled requires the `ldap` feature",
        ));
    }
    Ok(None)
}

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Unix seconds
    pub build_time: &'static str,
    pub git_hash: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION,
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info() {
        let info = build_info();
        assert_eq!(info.version, VERSION);
        assert!(!info.git_hash.is_empty());
    }

    #[test]
    fn test_constants() {
        assert_eq!(NAME, "warden");
    }
}
