//! Discussion question model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use bookclub_core::types::{DbId, Timestamp};

/// A row from the `discussion_questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DiscussionQuestion {
    pub id: DbId,
    pub book_id: DbId,
    pub question: String,
    /// Reading percentage at which the question unlocks.
    pub breakpoint: i32,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DiscussionQuestion {
    /// `(id, breakpoint)` pair as consumed by the progress gate.
    pub fn gate_entry(&self) -> (DbId, i32) {
        (self.id, self.breakpoint)
    }
}

/// DTO for creating a discussion question.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDiscussionQuestion {
    pub question: String,
    pub breakpoint: i32,
    pub sort_order: Option<i32>,
}
