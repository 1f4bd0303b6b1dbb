//! Handlers for threaded comments on discussion questions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use bookclub_core::badges::BadgeType;
use bookclub_core::discussion::validate_comment_content;
use bookclub_core::error::CoreError;
use bookclub_core::types::DbId;
use bookclub_db::models::comment::{Comment, CreateComment};
use bookclub_db::repositories::CommentRepo;

use crate::engine::activity;
use crate::error::{AppError, AppResult};
use crate::handlers::discussions::ensure_discussion_unlocked;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PostedComment {
    pub comment: Comment,
    pub new_badges: Vec<BadgeType>,
}

/// GET /api/v1/discussions/{id}/comments
///
/// Top-level comments with their replies. Requires the discussion to be
/// unlocked for the caller.
pub async fn list_comments(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(discussion_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_discussion_unlocked(&state.pool, auth.user_id, discussion_id).await?;

    let threads = CommentRepo::list_threads(&state.pool, discussion_id).await?;
    Ok(Json(DataResponse { data: threads }))
}

/// POST /api/v1/discussions/{id}/comments
///
/// Post a comment or a reply. Counts towards the weekly streak and may
/// award badges, which are returned with the comment.
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(discussion_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let content = validate_comment_content(&input.content)?;
    let discussion =
        ensure_discussion_unlocked(&state.pool, auth.user_id, discussion_id).await?;

    if let Some(parent_id) = input.parent_id {
        let parent = CommentRepo::find_by_id(&state.pool, parent_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Comment",
                id: parent_id,
            }))?;
        if parent.discussion_id != Some(discussion_id) || parent.book_id != discussion.book_id {
            return Err(AppError::Core(CoreError::Validation(
                "Parent comment belongs to a different discussion".to_string(),
            )));
        }
    }

    let comment = CommentRepo::create(
        &state.pool,
        auth.user_id,
        discussion.book_id,
        Some(discussion_id),
        input.parent_id,
        &content,
    )
    .await?;

    tracing::info!(
        comment_id = comment.id,
        discussion_id,
        parent_id = ?comment.parent_id,
        user_id = auth.user_id,
        "Comment posted"
    );

    let outcome = activity::record_activity(&state.pool, auth.user_id).await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PostedComment {
                comment,
                new_badges: outcome.new_badges,
            },
        }),
    ))
}
