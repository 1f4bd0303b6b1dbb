//! Reaction model.

use serde::Serialize;
use sqlx::FromRow;
use bookclub_core::types::{DbId, Timestamp};

/// A row from the `reactions` table. Exactly one of `comment_id` and
/// `review_id` is set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reaction {
    pub id: DbId,
    pub user_id: DbId,
    pub comment_id: Option<DbId>,
    pub review_id: Option<DbId>,
    pub reaction_type: String,
    pub created_at: Timestamp,
}

/// What a reaction is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTarget {
    Comment(DbId),
    Review(DbId),
}
