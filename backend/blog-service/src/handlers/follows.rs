//! Follow handlers. Every operation requires authentication; listings only
//! ever expose the principal's own edges.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::services::FollowService;

#[derive(Debug, Deserialize)]
pub struct FollowListQuery {
    pub search: Option<String>,
}

/// Request body for creating a follow edge
#[derive(Debug, Deserialize)]
pub struct CreateFollowRequest {
    /// Username of the user to follow
    pub following: String,
}

/// List the principal's follow edges, optionally filtered by followee username
pub async fn list_follows(
    pool: web::Data<PgPool>,
    user_id: UserId,
    query: web::Query<FollowListQuery>,
) -> Result<HttpResponse> {
    let service = FollowService::new((**pool).clone());
    let follows = service
        .list_follows(user_id.0, query.search.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(follows))
}

/// Follow another user by username
pub async fn create_follow(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<CreateFollowRequest>,
) -> Result<HttpResponse> {
    let service = FollowService::new((**pool).clone());
    let follow = service.create_follow(user_id.0, &req.following).await?;

    Ok(HttpResponse::Created().json(follow))
}

/// Unfollow by edge ID
pub async fn delete_follow(
    pool: web::Data<PgPool>,
    follow_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let service = FollowService::new((**pool).clone());
    service.delete_follow(*follow_id, user_id.0).await?;

    Ok(HttpResponse::NoContent().finish())
}
