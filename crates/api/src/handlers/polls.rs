//! Handlers for book-selection polls.
//!
//! The vote ledger itself lives in `PollRepo`; these handlers validate
//! input and translate each transaction outcome into an HTTP response.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use bookclub_core::book::validate_reading_month;
use bookclub_core::error::CoreError;
use bookclub_core::poll::{
    validate_candidates, validate_title, validate_window, NOT_A_CANDIDATE, POLL_CLOSED,
    POLL_NOT_OPEN,
};
use bookclub_core::types::DbId;
use bookclub_db::models::poll::{
    CandidateWithBook, CastVoteOutcome, ClosePollOutcome, CreatePoll, Poll, RemoveVoteOutcome,
    Vote,
};
use bookclub_db::repositories::{BookRepo, PollRepo};
use bookclub_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `PUT /polls/{id}/vote`.
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub book_id: DbId,
}

/// A poll with its candidates and the caller's vote.
#[derive(Debug, Serialize)]
pub struct PollDetail {
    #[serde(flatten)]
    pub poll: Poll,
    pub candidates: Vec<CandidateWithBook>,
    pub my_vote: Option<Vote>,
}

fn poll_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Poll", id })
}

fn poll_not_open(id: DbId) -> AppError {
    AppError::Core(CoreError::precondition(
        POLL_NOT_OPEN,
        format!("Poll {id} is not open for voting"),
    ))
}

async fn ensure_poll_exists(pool: &DbPool, id: DbId) -> AppResult<Poll> {
    PollRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| poll_not_found(id))
}

/// GET /api/v1/polls
///
/// Active polls first, then most recent.
pub async fn list_polls(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let polls = PollRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: polls }))
}

/// POST /api/v1/polls
///
/// Create a poll over existing books. The candidate books move to
/// Nominated in the same transaction. Admin only.
pub async fn create_poll(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreatePoll>,
) -> AppResult<impl IntoResponse> {
    validate_title(&input.title)?;
    validate_window(input.start_date, input.end_date)?;
    validate_reading_month(&input.for_month)?;
    validate_candidates(&input.book_ids)?;

    for &book_id in &input.book_ids {
        if BookRepo::find_by_id(&state.pool, book_id).await?.is_none() {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Candidate book {book_id} does not exist"
            ))));
        }
    }

    let poll = PollRepo::create(&state.pool, &input).await?;

    tracing::info!(
        poll_id = poll.id,
        candidates = input.book_ids.len(),
        for_month = %poll.for_month,
        user_id = admin.user_id,
        "Poll created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: poll })))
}

/// GET /api/v1/polls/{id}
pub async fn get_poll(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(poll_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let poll = ensure_poll_exists(&state.pool, poll_id).await?;
    let candidates = PollRepo::list_candidates(&state.pool, poll_id).await?;
    let my_vote = PollRepo::find_vote(&state.pool, auth.user_id, poll_id).await?;

    Ok(Json(DataResponse {
        data: PollDetail {
            poll,
            candidates,
            my_vote,
        },
    }))
}

/// PUT /api/v1/polls/{id}/vote
///
/// Cast or change the caller's vote. Re-voting for the same book is a
/// no-op that still returns the vote.
pub async fn cast_vote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(poll_id): Path<DbId>,
    Json(input): Json<CastVoteRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome =
        PollRepo::cast_vote(&state.pool, auth.user_id, poll_id, input.book_id, Utc::now()).await?;

    match outcome {
        CastVoteOutcome::Recorded { vote, changed } => {
            if !changed {
                tracing::debug!(poll_id, user_id = auth.user_id, "Re-vote for current choice");
            }
            Ok(Json(DataResponse { data: vote }))
        }
        CastVoteOutcome::PollNotFound => Err(poll_not_found(poll_id)),
        CastVoteOutcome::PollNotOpen => Err(poll_not_open(poll_id)),
        CastVoteOutcome::NotACandidate => Err(AppError::Core(CoreError::precondition(
            NOT_A_CANDIDATE,
            format!("Book {} is not a candidate in poll {poll_id}", input.book_id),
        ))),
        CastVoteOutcome::Contended => Err(AppError::Core(CoreError::Conflict(
            "Another vote by this user is being recorded; retry".to_string(),
        ))),
    }
}

/// DELETE /api/v1/polls/{id}/vote
pub async fn remove_vote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(poll_id): Path<DbId>,
) -> AppResult<StatusCode> {
    match PollRepo::remove_vote(&state.pool, auth.user_id, poll_id, Utc::now()).await? {
        RemoveVoteOutcome::Removed(_) => Ok(StatusCode::NO_CONTENT),
        RemoveVoteOutcome::PollNotFound => Err(poll_not_found(poll_id)),
        RemoveVoteOutcome::PollNotOpen => Err(poll_not_open(poll_id)),
        RemoveVoteOutcome::NoVote => Err(AppError::Core(CoreError::Missing(format!(
            "You have no vote in poll {poll_id}"
        )))),
    }
}

/// POST /api/v1/polls/{id}/close
///
/// Rank the candidates, schedule the winner for the poll's month and
/// return the others to Draft. Admin only.
pub async fn close_poll(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(poll_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    match PollRepo::close(&state.pool, poll_id).await? {
        ClosePollOutcome::Closed(closed) => {
            tracing::info!(poll_id, user_id = admin.user_id, "Poll closed by admin");
            Ok(Json(DataResponse { data: closed }))
        }
        ClosePollOutcome::PollNotFound => Err(poll_not_found(poll_id)),
        ClosePollOutcome::AlreadyClosed => Err(AppError::Core(CoreError::precondition(
            POLL_CLOSED,
            format!("Poll {poll_id} is already closed"),
        ))),
        ClosePollOutcome::NoCandidates => Err(AppError::Core(CoreError::Validation(format!(
            "Poll {poll_id} has no candidates to rank"
        )))),
    }
}
