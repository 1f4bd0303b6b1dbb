//! Handlers for discussion questions and the progress gate in front of them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use bookclub_core::discussion::{locked_error, validate_question};
use bookclub_core::error::CoreError;
use bookclub_core::progress::{self, validate_breakpoint, MIN_PROGRESS};
use bookclub_core::types::DbId;
use bookclub_db::models::discussion::{CreateDiscussionQuestion, DiscussionQuestion};
use bookclub_db::repositories::{DiscussionRepo, ProgressRepo};
use bookclub_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::books::ensure_book_exists;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// A discussion question as seen by one reader.
#[derive(Debug, Serialize)]
pub struct DiscussionView {
    pub id: DbId,
    pub book_id: DbId,
    pub breakpoint: i32,
    pub sort_order: i32,
    pub is_unlocked: bool,
    /// Omitted while the question is locked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

impl DiscussionView {
    fn for_reader(q: DiscussionQuestion, reader_progress: i32) -> Self {
        let is_unlocked = progress::is_unlocked(reader_progress, q.breakpoint);
        Self {
            id: q.id,
            book_id: q.book_id,
            breakpoint: q.breakpoint,
            sort_order: q.sort_order,
            is_unlocked,
            question: is_unlocked.then_some(q.question),
        }
    }
}

/// The caller's stored progress on a book, 0 if they have not started it.
pub(crate) async fn reader_progress(
    pool: &DbPool,
    user_id: DbId,
    book_id: DbId,
) -> AppResult<i32> {
    let stored = ProgressRepo::find(pool, user_id, book_id).await?;
    Ok(stored.map_or(MIN_PROGRESS, |p| p.progress))
}

/// Load a discussion question and check the caller has unlocked it.
pub(crate) async fn ensure_discussion_unlocked(
    pool: &DbPool,
    user_id: DbId,
    discussion_id: DbId,
) -> AppResult<DiscussionQuestion> {
    let question = ensure_discussion_exists(pool, discussion_id).await?;
    let current = reader_progress(pool, user_id, question.book_id).await?;
    if !progress::is_unlocked(current, question.breakpoint) {
        tracing::debug!(
            user_id,
            discussion_id,
            progress = current,
            breakpoint = question.breakpoint,
            "Discussion locked"
        );
        return Err(locked_error(current, question.breakpoint).into());
    }
    Ok(question)
}

async fn ensure_discussion_exists(pool: &DbPool, id: DbId) -> AppResult<DiscussionQuestion> {
    DiscussionRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "DiscussionQuestion",
            id,
        }))
}

/// GET /api/v1/books/{id}/discussions
///
/// Every question for the book, flagged locked or unlocked for the caller.
pub async fn list_discussions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_book_exists(&state.pool, book_id).await?;

    let current = reader_progress(&state.pool, auth.user_id, book_id).await?;
    let views: Vec<DiscussionView> = DiscussionRepo::list_for_book(&state.pool, book_id)
        .await?
        .into_iter()
        .map(|q| DiscussionView::for_reader(q, current))
        .collect();

    Ok(Json(DataResponse { data: views }))
}

/// POST /api/v1/books/{id}/discussions
///
/// Add a discussion question to a book. Admin only.
pub async fn create_discussion(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
    Json(input): Json<CreateDiscussionQuestion>,
) -> AppResult<impl IntoResponse> {
    validate_question(&input.question)?;
    validate_breakpoint(input.breakpoint)?;
    ensure_book_exists(&state.pool, book_id).await?;

    let question = DiscussionRepo::create(&state.pool, book_id, &input).await?;

    tracing::info!(
        discussion_id = question.id,
        book_id,
        breakpoint = question.breakpoint,
        user_id = admin.user_id,
        "Discussion question created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: question })))
}

/// DELETE /api/v1/discussions/{id}
///
/// Delete a question and, by cascade, its comments. Admin only.
pub async fn delete_discussion(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(discussion_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = DiscussionRepo::delete(&state.pool, discussion_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "DiscussionQuestion",
            id: discussion_id,
        }));
    }

    tracing::info!(discussion_id, user_id = admin.user_id, "Discussion question deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn question(breakpoint: i32) -> DiscussionQuestion {
        DiscussionQuestion {
            id: 7,
            book_id: 1,
            question: "Who is the narrator?".to_string(),
            breakpoint,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_locked_view_hides_question() {
        let view = DiscussionView::for_reader(question(50), 49);
        assert!(!view.is_unlocked);
        assert!(view.question.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("question").is_none());
    }

    #[test]
    fn test_view_unlocks_at_breakpoint() {
        let view = DiscussionView::for_reader(question(50), 50);
        assert!(view.is_unlocked);
        assert_eq!(view.question.as_deref(), Some("Who is the narrator?"));
    }
}
