//! Handlers for reactions on comments and reviews.
//!
//! Both targets share one implementation keyed by [`ReactionTarget`]; the
//! thin per-target handlers only resolve the content author.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use bookclub_core::badges::BadgeType;
use bookclub_core::error::CoreError;
use bookclub_core::reaction::{validate_not_self_reaction, ReactionType};
use bookclub_core::types::DbId;
use bookclub_db::models::reaction::{Reaction, ReactionTarget};
use bookclub_db::repositories::{CommentRepo, ReactionRepo, ReviewRepo};
use bookclub_db::DbPool;

use crate::engine::activity;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST .../reactions`.
#[derive(Debug, Deserialize)]
pub struct AddReactionRequest {
    pub reaction_type: String,
}

#[derive(Debug, Serialize)]
pub struct AddedReaction {
    pub reaction: Reaction,
    pub new_badges: Vec<BadgeType>,
}

/// Author of the reacted-to content, or 404.
async fn target_author(pool: &DbPool, target: ReactionTarget) -> AppResult<DbId> {
    let author = match target {
        ReactionTarget::Comment(id) => CommentRepo::find_by_id(pool, id)
            .await?
            .map(|c| c.user_id)
            .ok_or(CoreError::NotFound {
                entity: "Comment",
                id,
            }),
        ReactionTarget::Review(id) => ReviewRepo::find_by_id(pool, id)
            .await?
            .map(|r| r.user_id)
            .ok_or(CoreError::NotFound {
                entity: "Review",
                id,
            }),
    };
    Ok(author?)
}

async fn add_reaction(
    state: &AppState,
    auth: &AuthUser,
    target: ReactionTarget,
    input: AddReactionRequest,
) -> AppResult<(StatusCode, Json<DataResponse<AddedReaction>>)> {
    let reaction_type: ReactionType = input.reaction_type.parse()?;
    let author_id = target_author(&state.pool, target).await?;
    validate_not_self_reaction(auth.user_id, author_id)?;

    let (reaction, inserted) =
        ReactionRepo::add(&state.pool, auth.user_id, target, reaction_type).await?;

    if !inserted {
        return Ok((
            StatusCode::OK,
            Json(DataResponse {
                data: AddedReaction {
                    reaction,
                    new_badges: Vec::new(),
                },
            }),
        ));
    }

    tracing::info!(
        reaction_id = reaction.id,
        ?target,
        reaction_type = %reaction_type,
        user_id = auth.user_id,
        "Reaction added"
    );

    let outcome = activity::record_activity(&state.pool, auth.user_id).await;
    activity::evaluate_badges(&state.pool, author_id).await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: AddedReaction {
                reaction,
                new_badges: outcome.new_badges,
            },
        }),
    ))
}

async fn remove_reaction(
    state: &AppState,
    auth: &AuthUser,
    target: ReactionTarget,
    reaction_type: &str,
) -> AppResult<StatusCode> {
    let reaction_type: ReactionType = reaction_type.parse()?;
    let removed = ReactionRepo::remove(&state.pool, auth.user_id, target, reaction_type).await?;
    if !removed {
        return Err(AppError::Core(CoreError::Missing(match target {
            ReactionTarget::Comment(id) => {
                format!("You have no {reaction_type} reaction on comment {id}")
            }
            ReactionTarget::Review(id) => {
                format!("You have no {reaction_type} reaction on review {id}")
            }
        })));
    }

    tracing::info!(?target, reaction_type = %reaction_type, user_id = auth.user_id, "Reaction removed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// POST /api/v1/comments/{id}/reactions
///
/// Returns 201 when the reaction is new, 200 when it already existed.
pub async fn add_comment_reaction(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
    Json(input): Json<AddReactionRequest>,
) -> AppResult<impl IntoResponse> {
    add_reaction(&state, &auth, ReactionTarget::Comment(comment_id), input).await
}

/// DELETE /api/v1/comments/{id}/reactions/{type}
pub async fn remove_comment_reaction(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((comment_id, reaction_type)): Path<(DbId, String)>,
) -> AppResult<StatusCode> {
    remove_reaction(&state, &auth, ReactionTarget::Comment(comment_id), &reaction_type).await
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// POST /api/v1/reviews/{id}/reactions
pub async fn add_review_reaction(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(review_id): Path<DbId>,
    Json(input): Json<AddReactionRequest>,
) -> AppResult<impl IntoResponse> {
    add_reaction(&state, &auth, ReactionTarget::Review(review_id), input).await
}

/// DELETE /api/v1/reviews/{id}/reactions/{type}
pub async fn remove_review_reaction(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((review_id, reaction_type)): Path<(DbId, String)>,
) -> AppResult<StatusCode> {
    remove_reaction(&state, &auth, ReactionTarget::Review(review_id), &reaction_type).await
}
