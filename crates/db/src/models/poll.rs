//! Poll, candidate, and vote models, plus outcomes of the transactional
//! ledger operations.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use bookclub_core::types::{DbId, Timestamp};

use crate::models::book::Book;

/* --------------------------------------------------------------------------
   Rows
   -------------------------------------------------------------------------- */

/// A row from the `polls` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Poll {
    pub id: DbId,
    pub title: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    /// `YYYY-MM` the winning book will be read in.
    pub for_month: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `poll_candidates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PollCandidate {
    pub id: DbId,
    pub poll_id: DbId,
    pub book_id: DbId,
    pub vote_count: i32,
    /// Assigned once, when the poll closes.
    pub rank: Option<i32>,
}

/// A candidate joined with its book's title and author.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CandidateWithBook {
    pub id: DbId,
    pub book_id: DbId,
    pub title: String,
    pub author: String,
    pub vote_count: i32,
    pub rank: Option<i32>,
}

/// A row from the `votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vote {
    pub id: DbId,
    pub user_id: DbId,
    pub poll_id: DbId,
    pub book_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/* --------------------------------------------------------------------------
   DTOs
   -------------------------------------------------------------------------- */

/// DTO for creating a poll with its candidate books.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePoll {
    pub title: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub for_month: String,
    /// Candidate books, in display (and tie-break) order.
    pub book_ids: Vec<DbId>,
}

/* --------------------------------------------------------------------------
   Transaction outcomes
   -------------------------------------------------------------------------- */

/// Outcome of casting or changing a vote.
#[derive(Debug, Clone)]
pub enum CastVoteOutcome {
    /// The vote now points at the chosen book. `changed` is false for a
    /// re-vote of the same book.
    Recorded { vote: Vote, changed: bool },
    PollNotFound,
    PollNotOpen,
    NotACandidate,
    /// Another request by the same user inserted a vote concurrently.
    Contended,
}

/// Outcome of removing a vote.
#[derive(Debug, Clone)]
pub enum RemoveVoteOutcome {
    Removed(Vote),
    PollNotFound,
    PollNotOpen,
    NoVote,
}

/// Final state of a poll after closing.
#[derive(Debug, Clone, Serialize)]
pub struct ClosedPoll {
    pub poll: Poll,
    /// Candidates in rank order.
    pub candidates: Vec<PollCandidate>,
    pub winner: Option<Book>,
}

/// Outcome of closing a poll.
#[derive(Debug, Clone)]
pub enum ClosePollOutcome {
    Closed(ClosedPoll),
    PollNotFound,
    AlreadyClosed,
    /// The poll has no candidates to rank.
    NoCandidates,
}
