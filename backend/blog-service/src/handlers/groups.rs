//! Group handlers. Read-only; open to unauthenticated readers.

use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::GroupService;

/// List all groups, ordered by title
pub async fn list_groups(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let service = GroupService::new((**pool).clone());
    let groups = service.list_groups().await?;

    Ok(HttpResponse::Ok().json(groups))
}

/// Get a group by ID
pub async fn get_group(
    pool: web::Data<PgPool>,
    group_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = GroupService::new((**pool).clone());
    let group = service
        .get_group(*group_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

    Ok(HttpResponse::Ok().json(group))
}
