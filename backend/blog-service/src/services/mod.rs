//! Business logic layer. Each service owns a `PgPool` and the SQL for one
//! entity; handlers stay thin.

pub mod auth;
pub mod comments;
pub mod follows;
pub mod groups;
pub mod posts;

pub use auth::AuthService;
pub use comments::CommentService;
pub use follows::FollowService;
pub use groups::GroupService;
pub use posts::{PostService, UpdatePostFields};
