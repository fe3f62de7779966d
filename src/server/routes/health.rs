//! Health check endpoint

use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use tracing::{debug, error};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
    database: bool,
    cache: bool,
    directory_mirror: bool,
    pending_reconciliations: usize,
}

/// Liveness plus a round trip to the database and the cache tier
pub async fn health_check(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    debug!("Health check requested");

    let database = match state.database.health_check().await {
        Ok(()) => true,
        Err(e) => {
            error!("Database health check failed: {}", e);
            false
        }
    };

    let cache = match state.cache_backend.health_check().await {
        Ok(()) => true,
        Err(e) => {
            error!("Cache health check failed: {}", e);
            false
        }
    };

    let healthy = database && cache;
    let status = HealthStatus {
        status: if healthy { "healthy" } else { "degraded" },
        version: crate::VERSION,
        database,
        cache,
        directory_mirror: state.mirror.is_enabled(),
        pending_reconciliations: state.sync.pending_tasks().len(),
    };

    let response = if healthy {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    }
    .json(ApiResponse::success(status));
    Ok(response)
}
