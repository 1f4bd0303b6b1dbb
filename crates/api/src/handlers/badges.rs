//! Handlers for badge awards and pinning.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use bookclub_core::badges::BadgeType;
use bookclub_core::error::CoreError;
use bookclub_core::types::{DbId, Timestamp};
use bookclub_db::models::badge::UserBadge;
use bookclub_db::repositories::{BadgeRepo, UserRepo};
use bookclub_db::DbPool;

use crate::engine::activity;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// An award joined with its catalog entry.
#[derive(Debug, Serialize)]
pub struct BadgeView {
    pub id: DbId,
    pub badge_type: BadgeType,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub tier: i16,
    pub awarded_at: Timestamp,
    pub is_pinned: bool,
}

impl BadgeView {
    /// `None` for a stored type id missing from the catalog.
    fn from_award(award: UserBadge) -> Option<Self> {
        let badge_type = BadgeType::from_id(award.badge_type_id)?;
        let info = badge_type.info();
        Some(Self {
            id: award.id,
            badge_type,
            name: info.name,
            description: info.description,
            icon: info.icon,
            tier: info.tier,
            awarded_at: award.awarded_at,
            is_pinned: award.is_pinned,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct MyBadges {
    pub badges: Vec<BadgeView>,
    pub new_badges: Vec<BadgeType>,
}

async fn badge_views(pool: &DbPool, user_id: DbId) -> AppResult<Vec<BadgeView>> {
    Ok(BadgeRepo::list_for_user(pool, user_id)
        .await?
        .into_iter()
        .filter_map(BadgeView::from_award)
        .collect())
}

fn award_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "UserBadge",
        id,
    })
}

/// GET /api/v1/users/me/badges
///
/// Evaluates the badge rules first, so anything just earned is included
/// and also reported in `new_badges`.
pub async fn list_my_badges(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let new_badges = activity::evaluate_badges(&state.pool, auth.user_id).await;
    let badges = badge_views(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: MyBadges { badges, new_badges },
    }))
}

/// GET /api/v1/users/{id}/badges
pub async fn list_user_badges(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if UserRepo::find_by_id(&state.pool, user_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }
    let badges = badge_views(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: badges }))
}

/// PUT /api/v1/users/me/badges/{id}/pin
///
/// Pin one award; any previously pinned award is unpinned.
pub async fn pin_badge(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(award_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let award = BadgeRepo::pin(&state.pool, auth.user_id, award_id)
        .await?
        .ok_or_else(|| award_not_found(award_id))?;
    let view = BadgeView::from_award(award).ok_or_else(|| award_not_found(award_id))?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/users/me/badges/{id}/pin
pub async fn unpin_badge(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(award_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let award = BadgeRepo::unpin(&state.pool, auth.user_id, award_id)
        .await?
        .ok_or_else(|| award_not_found(award_id))?;
    tracing::info!(user_id = auth.user_id, award_id, "Badge unpinned");
    let view = BadgeView::from_award(award).ok_or_else(|| award_not_found(award_id))?;
    Ok(Json(DataResponse { data: view }))
}
