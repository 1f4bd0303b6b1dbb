//! Route definitions for discussion questions and their comments.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{comments, discussions};
use crate::state::AppState;

/// Routes mounted at `/discussions`.
///
/// ```text
/// DELETE /{id}                    delete_discussion (admin)
/// GET    /{id}/comments           list_comments
/// POST   /{id}/comments           create_comment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(discussions::delete_discussion))
        .route(
            "/{id}/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
}
