//! Post handlers.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::PostDetail;
use crate::services::{PostService, UpdatePostFields};

const MAX_PAGE_SIZE: i64 = 100;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub image_key: Option<String>,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub image_key: Option<String>,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostDetail>,
    pub total_count: i64,
    pub has_more: bool,
}

/// List posts with limit/offset pagination
pub async fn list_posts(
    pool: web::Data<PgPool>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.max(0);

    let service = PostService::new((**pool).clone());
    let (posts, total_count) = service.list_posts(limit, offset).await?;

    let has_more = offset + limit < total_count;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts,
        total_count,
        has_more,
    }))
}

/// Get a post by ID
pub async fn get_post(pool: web::Data<PgPool>, post_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service
        .get_post(*post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(post))
}

/// Create a new post; the author is always the authenticated principal
pub async fn create_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service
        .create_post(
            user_id.0,
            &req.content,
            req.image_key.as_deref(),
            req.group_id,
        )
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Update a post; owner only
pub async fn update_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let service = PostService::new((**pool).clone());
    let post = service
        .update_post(
            *post_id,
            user_id.0,
            UpdatePostFields {
                content: req.content,
                image_key: req.image_key,
                group_id: req.group_id,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post; owner only
pub async fn delete_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    service.delete_post(*post_id, user_id.0).await?;

    Ok(HttpResponse::NoContent().finish())
}
