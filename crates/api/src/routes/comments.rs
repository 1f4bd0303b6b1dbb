//! Route definitions for reactions on comments.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::reactions;
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// POST   /{id}/reactions          add_comment_reaction
/// DELETE /{id}/reactions/{type}   remove_comment_reaction
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/reactions", post(reactions::add_comment_reaction))
        .route(
            "/{id}/reactions/{reaction_type}",
            delete(reactions::remove_comment_reaction),
        )
}
