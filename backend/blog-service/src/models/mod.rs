//! Data models for blog-service.
//!
//! Entity structs map 1:1 onto table rows. The `*Detail` structs are joined
//! projections carrying usernames instead of raw ids, used in API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User account, the identity principal
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Community a post may optionally belong to; read-only through the API
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Post entity, owned by exactly one author
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub image_key: Option<String>,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Post joined with its author's username
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostDetail {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    pub image_key: Option<String>,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Comment entity, attached to exactly one post
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author's username
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentDetail {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Follow edge, directed from follower to followee
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Follow {
    pub id: Uuid,
    pub follower_id: Uuid,
    pub followee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Follow edge joined with both usernames
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FollowDetail {
    pub id: Uuid,
    /// Follower username
    pub user: String,
    /// Followee username
    pub following: String,
    pub created_at: DateTime<Utc>,
}
