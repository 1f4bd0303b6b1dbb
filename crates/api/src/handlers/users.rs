//! Handlers for the caller's streak.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use bookclub_core::error::CoreError;
use bookclub_core::streak::{self, IsoWeekId};
use bookclub_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_active_week: Option<String>,
    /// Active this week or last week.
    pub is_active: bool,
}

/// GET /api/v1/users/me/streak
///
/// Read-only; does not count as activity.
pub async fn get_my_streak(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    let last_week = user
        .last_active_week
        .as_deref()
        .and_then(|w| w.parse::<IsoWeekId>().ok());
    let is_active = streak::is_active(last_week, IsoWeekId::containing(Utc::now()));

    Ok(Json(DataResponse {
        data: StreakResponse {
            current_streak: user.current_streak,
            longest_streak: user.longest_streak,
            last_active_week: user.last_active_week,
            is_active,
        },
    }))
}
