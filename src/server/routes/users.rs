//! User administration

use crate::server::routes::auth::RegisterRequest;
use crate::server::routes::{ApiResponse, PageQuery};
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("", web::post().to(register_user))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}/roles", web::post().to(grant_roles))
            .route("/{id}/roles", web::delete().to(revoke_roles))
            .route("/{id}/disable", web::post().to(disable_user))
            .route("/{id}/enable", web::post().to(enable_user)),
    );
}

#[derive(Debug, Deserialize)]
pub struct RoleNamesRequest {
    pub roles: Vec<String>,
}

async fn list_users(state: web::Data<AppState>, query: web::Query<PageQuery>) -> Result<HttpResponse> {
    let users = state.users.list_users(query.page()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

async fn register_user(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let user = state
        .users
        .register_user(&body.name, &body.email, &body.password)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(user)))
}

async fn get_user(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    let (user, roles) = state.users.get_user(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "user": user,
        "roles": roles,
    }))))
}

async fn grant_roles(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<RoleNamesRequest>,
) -> Result<HttpResponse> {
    let roles = state.users.grant_roles(id.into_inner(), &body.roles).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(roles)))
}

async fn revoke_roles(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<RoleNamesRequest>,
) -> Result<HttpResponse> {
    let roles = state.users.revoke_roles(id.into_inner(), &body.roles).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(roles)))
}

async fn disable_user(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    state.users.disable_user(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok()))
}

async fn enable_user(state: web::Data<AppState>, id: web::Path<i64>) -> Result<HttpResponse> {
    state.users.enable_user(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok()))
}
