//! Auth service: account registration, credential login, token refresh, and
//! account deletion. Deleting an account cascades posts, comments, and
//! follow edges at the storage layer.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::User;
use crate::security::{jwt, password};

pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account
    pub async fn register(&self, username: &str, email: &str, raw_password: &str) -> Result<User> {
        let password_hash = password::hash_password(raw_password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_register_error)?;

        tracing::info!(user_id = %user.id, "account registered");

        Ok(user)
    }

    /// Exchange username + password for a token pair
    pub async fn login(&self, username: &str, raw_password: &str) -> Result<jwt::TokenResponse> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !password::verify_password(raw_password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        jwt::generate_token_pair(user.id, &user.email, &user.username)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Exchange a valid refresh token for a fresh token pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<jwt::TokenResponse> {
        let data = jwt::validate_token(refresh_token)
            .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        if data.claims.token_type != "refresh" {
            return Err(AppError::Unauthorized(
                "Not a refresh token".to_string(),
            ));
        }

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid refresh token subject".to_string()))?;

        // The account may have been deleted since the token was issued
        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        jwt::generate_token_pair(user.id, &user.email, &user.username)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Current user for `user_id`
    pub async fn me(&self, user_id: Uuid) -> Result<User> {
        self.find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Delete the account; storage-level cascades remove the user's posts,
    /// comments, and follow edges in both directions
    pub async fn delete_account(&self, user_id: Uuid) -> Result<()> {
        let affected = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(%user_id, "account deleted");

        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

fn map_register_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.constraint() {
            Some("users_username_key") => {
                return AppError::Conflict("Username already exists".to_string())
            }
            Some("users_email_key") => {
                return AppError::Conflict("Email already exists".to_string())
            }
            _ => {}
        }
    }
    AppError::from(err)
}
