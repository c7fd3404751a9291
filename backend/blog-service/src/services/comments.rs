//! Comment service. Every operation is scoped to a parent post: the post is
//! resolved first and a comment is only addressable under its own post.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::permissions::check_comment_ownership;
use crate::models::{Comment, CommentDetail, Post};

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the comments attached to a post, oldest first
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentDetail>> {
        let post = self.resolve_post(post_id).await?;

        let comments = sqlx::query_as::<_, CommentDetail>(
            r#"
            SELECT c.id, c.post_id, u.username AS author, c.content, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(post.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Get a single comment under a post
    pub async fn get_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<CommentDetail> {
        let post = self.resolve_post(post_id).await?;

        sqlx::query_as::<_, CommentDetail>(
            r#"
            SELECT c.id, c.post_id, u.username AS author, c.content, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.id = $1 AND c.post_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(post.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }

    /// Create a comment authored by `user_id` on the resolved parent post
    pub async fn create_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentDetail> {
        let post = self.resolve_post(post_id).await?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, user_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, user_id, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        self.get_comment(post.id, comment.id).await
    }

    /// Update a comment's text; only the author may do this
    pub async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CommentDetail> {
        let post = self.resolve_post(post_id).await?;
        let comment = self.require_comment(post.id, comment_id).await?;
        check_comment_ownership(user_id, &comment)?;

        sqlx::query("UPDATE comments SET content = $1 WHERE id = $2")
            .bind(content)
            .bind(comment.id)
            .execute(&self.pool)
            .await?;

        self.get_comment(post.id, comment.id).await
    }

    /// Delete a comment; only the author may do this
    pub async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<()> {
        let post = self.resolve_post(post_id).await?;
        let comment = self.require_comment(post.id, comment_id).await?;
        check_comment_ownership(user_id, &comment)?;

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Resolve the parent post or fail with NotFound
    async fn resolve_post(&self, post_id: Uuid) -> Result<Post> {
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

    async fn require_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, created_at
            FROM comments
            WHERE id = $1 AND post_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
    }
}
