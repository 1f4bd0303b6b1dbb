//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use bookclub_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub current_streak: i32,
    pub longest_streak: i32,
    /// ISO week identifier (`YYYY-Www`) of the last qualifying activity.
    pub last_active_week: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for provisioning a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub display_name: String,
    pub email: String,
    pub role: Option<String>,
}

/// Result of recording one qualifying activity against a user's streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakUpdate {
    pub current_streak: i32,
    pub longest_streak: i32,
    /// False when the user was already active this week.
    pub is_new_week: bool,
}
