//! Reading progress model.

use serde::Serialize;
use sqlx::FromRow;
use bookclub_core::types::{DbId, Timestamp};

/// A row from the `reading_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReadingProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub book_id: DbId,
    pub progress: i32,
    pub is_finished: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of a monotonic progress write.
#[derive(Debug, Clone)]
pub struct ProgressWrite {
    /// Stored value before the write (`None` on the first write).
    pub previous: Option<i32>,
    /// Row as stored after the write.
    pub current: ReadingProgress,
}
