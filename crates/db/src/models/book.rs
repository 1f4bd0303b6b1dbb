//! Book entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use bookclub_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `books` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub page_count: Option<i32>,
    pub status_id: StatusId,
    /// `YYYY-MM` the club reads this book in, once scheduled.
    pub reading_month: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub page_count: Option<i32>,
}

/// DTO for updating a book. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub page_count: Option<i32>,
    /// Status name (`draft`, `nominated`, `scheduled`, `current`, `completed`).
    pub status: Option<String>,
    pub reading_month: Option<String>,
}
