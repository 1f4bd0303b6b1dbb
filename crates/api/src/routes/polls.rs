//! Route definitions for polls.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::polls;
use crate::state::AppState;

/// Routes mounted at `/polls`.
///
/// ```text
/// GET    /                        list_polls
/// POST   /                        create_poll (admin)
/// GET    /{id}                    get_poll
/// PUT    /{id}/vote               cast_vote
/// DELETE /{id}/vote               remove_vote
/// POST   /{id}/close              close_poll (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(polls::list_polls).post(polls::create_poll))
        .route("/{id}", get(polls::get_poll))
        .route("/{id}/vote", put(polls::cast_vote).delete(polls::remove_vote))
        .route("/{id}/close", post(polls::close_poll))
}
