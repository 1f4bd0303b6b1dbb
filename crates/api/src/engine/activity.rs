//! Streak and badge side effects of user activity.
//!
//! Handlers call [`record_activity`] after an action that counts towards the
//! weekly streak (progress update, comment, reaction) and
//! [`evaluate_badges`] when only the badge rules need rechecking. Both run
//! after the primary write has committed, so a failure here never rolls
//! back the user's action; it is logged and reported as "no change".

use chrono::Utc;
use serde::Serialize;
use bookclub_core::badges::BadgeType;
use bookclub_core::types::DbId;
use bookclub_db::models::user::StreakUpdate;
use bookclub_db::repositories::{BadgeRepo, UserRepo};
use bookclub_db::DbPool;

/// What an activity changed for the acting user.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityOutcome {
    pub streak: Option<StreakUpdate>,
    pub new_badges: Vec<BadgeType>,
}

/// Advance the user's streak for this week.
pub async fn record_streak(pool: &DbPool, user_id: DbId) -> Option<StreakUpdate> {
    match UserRepo::record_activity(pool, user_id, Utc::now()).await {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Failed to record streak activity");
            None
        }
    }
}

/// Award any badges the user now qualifies for.
pub async fn evaluate_badges(pool: &DbPool, user_id: DbId) -> Vec<BadgeType> {
    match BadgeRepo::check_and_award(pool, user_id).await {
        Ok(badges) => badges,
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Failed to evaluate badges");
            Vec::new()
        }
    }
}

/// Streak first, then badges, so streak badges see the updated count.
pub async fn record_activity(pool: &DbPool, user_id: DbId) -> ActivityOutcome {
    let streak = record_streak(pool, user_id).await;
    let new_badges = evaluate_badges(pool, user_id).await;
    ActivityOutcome { streak, new_badges }
}
