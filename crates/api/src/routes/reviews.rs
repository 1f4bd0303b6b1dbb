//! Route definitions for reactions on reviews.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::reactions;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// POST   /{id}/reactions          add_review_reaction
/// DELETE /{id}/reactions/{type}   remove_review_reaction
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/reactions", post(reactions::add_review_reaction))
        .route(
            "/{id}/reactions/{reaction_type}",
            delete(reactions::remove_review_reaction),
        )
}
