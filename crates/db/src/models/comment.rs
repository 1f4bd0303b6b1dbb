//! Comment model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use bookclub_core::types::{DbId, Timestamp};

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub user_id: DbId,
    pub book_id: DbId,
    pub discussion_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for posting a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub content: String,
    pub parent_id: Option<DbId>,
}

/// A comment joined with its author's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentWithAuthor {
    pub id: DbId,
    pub user_id: DbId,
    pub author_name: String,
    pub book_id: DbId,
    pub discussion_id: Option<DbId>,
    pub parent_id: Option<DbId>,
    pub content: String,
    pub created_at: Timestamp,
}

/// A top-level comment with its direct replies.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: CommentWithAuthor,
    pub replies: Vec<CommentWithAuthor>,
}
