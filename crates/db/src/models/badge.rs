//! Badge award model.

use serde::Serialize;
use sqlx::FromRow;
use bookclub_core::badges::BadgeTypeId;
use bookclub_core::types::{DbId, Timestamp};

/// A row from the `user_badges` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserBadge {
    pub id: DbId,
    pub user_id: DbId,
    pub badge_type_id: BadgeTypeId,
    pub is_pinned: bool,
    pub awarded_at: Timestamp,
}
