//! Policy administration

use crate::server::routes::{ApiResponse, PageQuery};
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/policies")
            .route("", web::get().to(list_policies))
            .route("", web::post().to(create_policy))
            .route("/{id}", web::get().to(get_policy))
            .route("/{id}", web::patch().to(update_policy))
            .route("/{id}", web::delete().to(delete_policy)),
    );
}

#[derive(Debug, Deserialize)]
pub struct CreatePolicyRequest {
    pub name: String,
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePolicyRequest {
    pub description: String,
}

async fn list_policies(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let policies = state.policies.list_policies(query.page()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(policies)))
}

async fn create_policy(
    state: web::Data<AppState>,
    body: web::Json<CreatePolicyRequest>,
) -> Result<HttpResponse> {
    let policy = state
        .policies
        .create_policy(&body.name, &body.path, &body.method, &body.description)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(policy)))
}

async fn get_policy(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    let policy = state.policies.get_policy(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(policy)))
}

async fn update_policy(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<UpdatePolicyRequest>,
) -> Result<HttpResponse> {
    let policy = state
        .policies
        .update_policy_description(id.into_inner(), &body.description)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(policy)))
}

async fn delete_policy(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    state.policies.delete_policy(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok()))
}
