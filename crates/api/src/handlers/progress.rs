//! Handlers for reading progress and the discussions it unlocks.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use bookclub_core::error::CoreError;
use bookclub_core::progress::{self, MAX_PROGRESS, MIN_PROGRESS};
use bookclub_core::types::DbId;
use bookclub_db::repositories::{DiscussionRepo, ProgressRepo};

use crate::engine::activity;
use crate::error::AppResult;
use crate::handlers::books::ensure_book_exists;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `PUT /books/{id}/progress`.
///
/// `progress` is taken as raw JSON so that strings, fractions and
/// out-of-range numbers all fail with the same validation error.
#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub progress: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub progress: i32,
    pub is_finished: bool,
    pub unlocked_discussion_ids: Vec<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newly_unlocked_ids: Option<Vec<DbId>>,
}

fn parse_progress(value: &serde_json::Value) -> Result<i32, CoreError> {
    match value.as_i64() {
        Some(p) => progress::validate_progress(p),
        None => Err(CoreError::Validation(format!(
            "progress must be an integer between {MIN_PROGRESS} and {MAX_PROGRESS}"
        ))),
    }
}

/// PUT /api/v1/books/{id}/progress
///
/// Record progress (never lowering the stored value) and report which
/// discussions are unlocked, and which were unlocked by this write.
pub async fn update_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
    Json(input): Json<UpdateProgressRequest>,
) -> AppResult<impl IntoResponse> {
    let submitted = parse_progress(&input.progress)?;
    ensure_book_exists(&state.pool, book_id).await?;

    let write = ProgressRepo::record(&state.pool, auth.user_id, book_id, submitted).await?;
    let gate = DiscussionRepo::breakpoints_for_book(&state.pool, book_id).await?;

    let before = write.previous.unwrap_or(MIN_PROGRESS);
    let after = write.current.progress;
    let newly_unlocked = progress::newly_unlocked_ids(before, after, &gate);

    tracing::info!(
        user_id = auth.user_id,
        book_id,
        submitted,
        stored = after,
        newly_unlocked = newly_unlocked.len(),
        "Progress recorded"
    );

    activity::record_streak(&state.pool, auth.user_id).await;

    Ok(Json(DataResponse {
        data: ProgressResponse {
            progress: after,
            is_finished: write.current.is_finished,
            unlocked_discussion_ids: progress::unlocked_ids(after, &gate),
            newly_unlocked_ids: Some(newly_unlocked),
        },
    }))
}

/// GET /api/v1/books/{id}/progress
///
/// Progress is 0 for a book the caller has not started.
pub async fn get_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_book_exists(&state.pool, book_id).await?;

    let stored = ProgressRepo::find(&state.pool, auth.user_id, book_id).await?;
    let current = stored.as_ref().map_or(MIN_PROGRESS, |p| p.progress);
    let gate = DiscussionRepo::breakpoints_for_book(&state.pool, book_id).await?;

    Ok(Json(DataResponse {
        data: ProgressResponse {
            progress: current,
            is_finished: progress::is_finished(current),
            unlocked_discussion_ids: progress::unlocked_ids(current, &gate),
            newly_unlocked_ids: None,
        },
    }))
}

/// GET /api/v1/users/me/progress
pub async fn list_my_progress(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = ProgressRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: rows }))
}
