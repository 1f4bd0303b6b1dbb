//! Route definitions for caller-scoped views and member badges.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{badges, progress, users};
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /me/progress             list_my_progress
/// GET    /me/streak               get_my_streak
/// GET    /me/badges               list_my_badges
/// PUT    /me/badges/{id}/pin      pin_badge
/// DELETE /me/badges/{id}/pin      unpin_badge
/// GET    /{id}/badges             list_user_badges
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me/progress", get(progress::list_my_progress))
        .route("/me/streak", get(users::get_my_streak))
        .route("/me/badges", get(badges::list_my_badges))
        .route(
            "/me/badges/{id}/pin",
            put(badges::pin_badge).delete(badges::unpin_badge),
        )
        .route("/{id}/badges", get(badges::list_user_badges))
}
