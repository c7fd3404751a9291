//! Auth handlers: registration, credential login, token refresh, and the
//! current-account endpoints.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::Result;
use crate::middleware::UserId;
use crate::services::AuthService;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Register a new account
pub async fn register(
    pool: web::Data<PgPool>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = AuthService::new((**pool).clone());
    let user = service
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Exchange credentials for a token pair
pub async fn login(pool: web::Data<PgPool>, req: web::Json<LoginRequest>) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone());
    let tokens = service.login(&req.username, &req.password).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// Exchange a refresh token for a fresh token pair
pub async fn refresh(
    pool: web::Data<PgPool>,
    req: web::Json<RefreshRequest>,
) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone());
    let tokens = service.refresh(&req.refresh_token).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// Current user
pub async fn me(pool: web::Data<PgPool>, user_id: UserId) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone());
    let user = service.me(user_id.0).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Delete the current account, cascading owned records
pub async fn delete_account(pool: web::Data<PgPool>, user_id: UserId) -> Result<HttpResponse> {
    let service = AuthService::new((**pool).clone());
    service.delete_account(user_id.0).await?;

    Ok(HttpResponse::NoContent().finish())
}
