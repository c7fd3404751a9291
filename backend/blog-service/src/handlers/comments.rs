//! Comment handlers, scoped to a parent post path parameter.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::services::CommentService;

/// Request body for creating a comment
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Request body for updating a comment
#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// List the comments attached to a post
pub async fn list_comments(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comments = service.list_comments(*post_id).await?;

    Ok(HttpResponse::Ok().json(comments))
}

/// Get a single comment under a post
pub async fn get_comment(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new((**pool).clone());
    let comment = service.get_comment(post_id, comment_id).await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Create a comment; author is the principal, post is the resolved parent
pub async fn create_comment(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comment = service
        .create_comment(*post_id, user_id.0, &req.content)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// Update a comment; owner only
pub async fn update_comment(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
    user_id: UserId,
    req: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new((**pool).clone());
    let comment = service
        .update_comment(post_id, comment_id, user_id.0, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Delete a comment; owner only
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    path: web::Path<(Uuid, Uuid)>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new((**pool).clone());
    service.delete_comment(post_id, comment_id, user_id.0).await?;

    Ok(HttpResponse::NoContent().finish())
}
