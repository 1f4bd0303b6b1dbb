//! Handlers for book reviews.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use bookclub_core::review::{validate_rating, validate_review_content};
use bookclub_core::types::DbId;
use bookclub_db::models::review::UpsertReview;
use bookclub_db::repositories::ReviewRepo;

use crate::error::AppResult;
use crate::handlers::books::ensure_book_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/books/{id}/reviews
pub async fn list_reviews(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_book_exists(&state.pool, book_id).await?;
    let reviews = ReviewRepo::list_for_book(&state.pool, book_id).await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// PUT /api/v1/books/{id}/reviews
///
/// Write the caller's review of a book, replacing any earlier one.
pub async fn upsert_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
    Json(input): Json<UpsertReview>,
) -> AppResult<impl IntoResponse> {
    validate_rating(input.rating)?;
    let content = validate_review_content(&input.content)?;
    ensure_book_exists(&state.pool, book_id).await?;

    let review =
        ReviewRepo::upsert(&state.pool, auth.user_id, book_id, input.rating, &content).await?;

    tracing::info!(
        review_id = review.id,
        book_id,
        rating = review.rating,
        user_id = auth.user_id,
        "Review saved"
    );

    Ok(Json(DataResponse { data: review }))
}
