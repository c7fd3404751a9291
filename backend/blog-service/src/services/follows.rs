//! Follow service.
//!
//! Creation is a single atomic insert: the unique constraint on
//! (follower_id, followee_id) decides duplicates, so two concurrent
//! identical requests cannot both succeed and the loser sees the same
//! validation failure as a plain duplicate.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Follow, FollowDetail};

pub struct FollowService {
    pool: PgPool,
}

impl FollowService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List the principal's own follow edges, newest first, optionally
    /// filtered by a case-insensitive substring of the followee's username
    pub async fn list_follows(
        &self,
        follower_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<FollowDetail>> {
        let follows = sqlx::query_as::<_, FollowDetail>(
            r#"
            SELECT f.id, fr.username AS "user", fe.username AS following, f.created_at
            FROM follows f
            JOIN users fr ON fr.id = f.follower_id
            JOIN users fe ON fe.id = f.followee_id
            WHERE f.follower_id = $1
              AND ($2::TEXT IS NULL OR fe.username ILIKE '%' || $2 || '%')
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(follower_id)
        .bind(search)
        .fetch_all(&self.pool)
        .await?;

        Ok(follows)
    }

    /// Follow the user named `followee_username` on behalf of `follower_id`
    ///
    /// Validation order: unknown target, then self-follow, then duplicate.
    pub async fn create_follow(
        &self,
        follower_id: Uuid,
        followee_username: &str,
    ) -> Result<FollowDetail> {
        let followee_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE username = $1",
        )
        .bind(followee_username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if followee_id == follower_id {
            return Err(AppError::Validation(
                "You cannot follow yourself".to_string(),
            ));
        }

        let inserted = sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (id, follower_id, followee_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (follower_id, followee_id) DO NOTHING
            RETURNING id, follower_id, followee_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(&self.pool)
        .await?;

        let follow = inserted.ok_or_else(|| {
            AppError::Validation("You are already following this user".to_string())
        })?;

        self.require_detail(follow.id).await
    }

    /// Remove one of the principal's own follow edges
    ///
    /// An edge that does not exist, or belongs to another principal, is
    /// indistinguishable: both are NotFound.
    pub async fn delete_follow(&self, follow_id: Uuid, follower_id: Uuid) -> Result<()> {
        let affected = sqlx::query(
            "DELETE FROM follows WHERE id = $1 AND follower_id = $2",
        )
        .bind(follow_id)
        .bind(follower_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound("Follow not found".to_string()));
        }

        Ok(())
    }

    async fn require_detail(&self, follow_id: Uuid) -> Result<FollowDetail> {
        sqlx::query_as::<_, FollowDetail>(
            r#"
            SELECT f.id, fr.username AS "user", fe.username AS following, f.created_at
            FROM follows f
            JOIN users fr ON fr.id = f.follower_id
            JOIN users fe ON fe.id = f.followee_id
            WHERE f.id = $1
            "#,
        )
        .bind(follow_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to load follow after write".to_string()))
    }
}
