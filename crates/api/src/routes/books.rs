//! Route definitions for books and the per-book resources beneath them.

use axum::routing::get;
use axum::Router;

use crate::handlers::{books, discussions, progress, reviews};
use crate::state::AppState;

/// Routes mounted at `/books`.
///
/// ```text
/// GET    /                        list_books (?status=)
/// POST   /                        create_book (admin)
/// GET    /{id}                    get_book
/// PUT    /{id}                    update_book (admin)
/// GET    /{id}/progress           get_progress
/// PUT    /{id}/progress           update_progress
/// GET    /{id}/discussions        list_discussions
/// POST   /{id}/discussions        create_discussion (admin)
/// GET    /{id}/reviews            list_reviews
/// PUT    /{id}/reviews            upsert_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list_books).post(books::create_book))
        .route("/{id}", get(books::get_book).put(books::update_book))
        .route(
            "/{id}/progress",
            get(progress::get_progress).put(progress::update_progress),
        )
        .route(
            "/{id}/discussions",
            get(discussions::list_discussions).post(discussions::create_discussion),
        )
        .route(
            "/{id}/reviews",
            get(reviews::list_reviews).put(reviews::upsert_review),
        )
}
