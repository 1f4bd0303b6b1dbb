//! Review model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use bookclub_core::types::{DbId, Timestamp};

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub user_id: DbId,
    pub book_id: DbId,
    pub rating: i16,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for writing (or rewriting) the caller's review of a book.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertReview {
    pub rating: i16,
    pub content: String,
}
