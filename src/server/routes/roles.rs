//! Role administration

use crate::server::routes::{ApiResponse, PageQuery};
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/roles")
            .route("", web::get().to(list_roles))
            .route("", web::post().to(create_role))
            .route("/{id}", web::get().to(get_role))
            .route("/{id}", web::patch().to(update_role))
            .route("/{id}", web::delete().to(delete_role))
            .route("/{id}/policies", web::post().to(grant_policies))
            .route("/{id}/policies", web::delete().to(revoke_policies)),
    )
    .route("/reconcile", web::post().to(reconcile));
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct PolicyIdsRequest {
    pub policy_ids: Vec<i64>,
}

async fn list_roles(state: web::Data<AppState>, query: web::Query<PageQuery>) -> Result<HttpResponse> {
    let roles = state.roles.list_roles(query.page()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(roles)))
}

async fn create_role(
    state: web::Data<AppState>,
    body: web::Json<CreateRoleRequest>,
) -> Result<HttpResponse> {
    let role = state.roles.create_role(&body.name, &body.description).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(role)))
}

async fn get_role(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    let role = state.roles.get_role(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(role)))
}

async fn update_role(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse> {
    let role = state
        .roles
        .update_role_description(id.into_inner(), &body.description)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(role)))
}

async fn delete_role(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    state.roles.delete_role(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok()))
}

async fn grant_policies(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<PolicyIdsRequest>,
) -> Result<HttpResponse> {
    let tuples = state
        .roles
        .grant_policies(id.into_inner(), &body.policy_ids)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(tuples)))
}

async fn revoke_policies(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<PolicyIdsRequest>,
) -> Result<HttpResponse> {
    let tuples = state
        .roles
        .revoke_policies(id.into_inner(), &body.policy_ids)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(tuples)))
}

/// Replay queued partial mutations
async fn reconcile(state: web::Data<AppState>) -> Result<HttpResponse> {
    let replayed = state.sync.drain_pending().await;
    let remaining = state.sync.pending_tasks();
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "replayed": replayed,
        "remaining": remaining,
    }))))
}
