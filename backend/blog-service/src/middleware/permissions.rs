//! Ownership-based permission checks.
//!
//! Reads are open to anyone; writes require the requesting principal to be
//! the record's author. These checks run after the record has been loaded,
//! so a missing record surfaces as NotFound before a permission failure.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Comment, Post};

/// Result type for permission checks
pub type PermissionResult = Result<(), AppError>;

/// Check if a user owns a post
pub fn check_post_ownership(user_id: Uuid, post: &Post) -> PermissionResult {
    if post.user_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this post".to_string(),
        ))
    }
}

/// Check if a user owns a comment
pub fn check_comment_ownership(user_id: Uuid, comment: &Comment) -> PermissionResult {
    if comment.user_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this comment".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_post(user_id: Uuid) -> Post {
        Post {
            id: Uuid::new_v4(),
            user_id,
            content: "hello".to_string(),
            image_key: None,
            group_id: None,
            created_at: Utc::now(),
        }
    }

    fn sample_comment(user_id: Uuid) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            user_id,
            content: "hi".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_can_modify_post() {
        let user_id = Uuid::new_v4();
        assert!(check_post_ownership(user_id, &sample_post(user_id)).is_ok());
    }

    #[test]
    fn test_non_owner_cannot_modify_post() {
        let result = check_post_ownership(Uuid::new_v4(), &sample_post(Uuid::new_v4()));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_owner_can_modify_comment() {
        let user_id = Uuid::new_v4();
        assert!(check_comment_ownership(user_id, &sample_comment(user_id)).is_ok());
    }

    #[test]
    fn test_non_owner_cannot_modify_comment() {
        let result = check_comment_ownership(Uuid::new_v4(), &sample_comment(Uuid::new_v4()));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
