//! Self-service: registration, login, logout, password, profile

use crate::core::models::{Identity, UserProfile};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::Result;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/password", web::put().to(change_password))
            .route("/profile", web::put().to(update_profile))
            .route("/info", web::get().to(info)),
    );
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

async fn register(state: web::Data<AppState>, body: web::Json<RegisterRequest>) -> Result<HttpResponse> {
    let user = state
        .users
        .register_user(&body.name, &body.email, &body.password)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(user)))
}

async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> Result<HttpResponse> {
    let token = state.users.login(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(token)))
}

async fn logout(state: web::Data<AppState>, identity: web::ReqData<Identity>) -> Result<HttpResponse> {
    state.users.logout(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok()))
}

async fn change_password(
    state: web::Data<AppState>,
    identity: web::ReqData<Identity>,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse> {
    state
        .users
        .change_password(identity.user_id, &body.old_password, &body.new_password)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok()))
}

async fn update_profile(
    state: web::Data<AppState>,
    identity: web::ReqData<Identity>,
    body: web::Json<UserProfile>,
) -> Result<HttpResponse> {
    let user = state.users.update_profile(identity.user_id, &body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}

async fn info(state: web::Data<AppState>, identity: web::ReqData<Identity>) -> Result<HttpResponse> {
    let info = state.users.info(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(info)))
}
