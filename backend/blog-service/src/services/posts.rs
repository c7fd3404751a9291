//! Post service. Authorship is always the authenticated principal; the
//! creation timestamp is set by the database and never updated.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::permissions::check_post_ownership;
use crate::models::{Post, PostDetail};

/// Optional fields for partial post updates; absent fields keep their value
#[derive(Debug, Default)]
pub struct UpdatePostFields {
    pub content: Option<String>,
    pub image_key: Option<String>,
    pub group_id: Option<Uuid>,
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List posts, newest first, with the total row count for pagination
    pub async fn list_posts(&self, limit: i64, offset: i64) -> Result<(Vec<PostDetail>, i64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        let posts = sqlx::query_as::<_, PostDetail>(
            r#"
            SELECT p.id, u.username AS author, p.content, p.image_key, p.group_id, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((posts, total))
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<PostDetail>> {
        let post = sqlx::query_as::<_, PostDetail>(
            r#"
            SELECT p.id, u.username AS author, p.content, p.image_key, p.group_id, p.created_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Create a new post authored by `user_id`
    pub async fn create_post(
        &self,
        user_id: Uuid,
        content: &str,
        image_key: Option<&str>,
        group_id: Option<Uuid>,
    ) -> Result<PostDetail> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, user_id, content, image_key, group_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, content, image_key, group_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(content)
        .bind(image_key)
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_write_error)?;

        self.require_detail(post.id).await
    }

    /// Update a post's mutable fields; only the author may do this
    pub async fn update_post(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        fields: UpdatePostFields,
    ) -> Result<PostDetail> {
        let post = self.require_post(post_id).await?;
        check_post_ownership(user_id, &post)?;

        sqlx::query(
            r#"
            UPDATE posts
            SET content = COALESCE($1, content),
                image_key = COALESCE($2, image_key),
                group_id = COALESCE($3, group_id)
            WHERE id = $4
            "#,
        )
        .bind(fields.content)
        .bind(fields.image_key)
        .bind(fields.group_id)
        .bind(post_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_write_error)?;

        self.require_detail(post_id).await
    }

    /// Delete a post; only the author may do this
    pub async fn delete_post(&self, post_id: Uuid, user_id: Uuid) -> Result<()> {
        let post = self.require_post(post_id).await?;
        check_post_ownership(user_id, &post)?;

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn require_post(&self, post_id: Uuid) -> Result<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, content, image_key, group_id, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    async fn require_detail(&self, post_id: Uuid) -> Result<PostDetail> {
        self.get_post(post_id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to load post after write".to_string()))
    }
}

/// A broken group reference is a client error, not a server fault
fn map_post_write_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.constraint() == Some("posts_group_id_fkey") {
            return AppError::Validation("Unknown group".to_string());
        }
    }
    AppError::from(err)
}
