//! Poll rules: open window, vote bookkeeping, and close-time ranking.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/* --------------------------------------------------------------------------
Precondition codes
-------------------------------------------------------------------------- */

/// The poll is inactive or outside its voting window.
pub const POLL_NOT_OPEN: &str = "POLL_NOT_OPEN";

/// The chosen book is not registered as a candidate of the poll.
pub const NOT_A_CANDIDATE: &str = "NOT_A_CANDIDATE";

/// The poll has already been closed.
pub const POLL_CLOSED: &str = "POLL_CLOSED";

/// Minimum number of candidate books a poll must offer.
pub const MIN_CANDIDATES: usize = 2;

/// Maximum length of a poll title.
pub const MAX_TITLE_LENGTH: usize = 200;

/* --------------------------------------------------------------------------
Window and input validation
-------------------------------------------------------------------------- */

/// Whether votes may be cast at `now`. Both window bounds are inclusive.
pub fn is_open(start_date: Timestamp, end_date: Timestamp, is_active: bool, now: Timestamp) -> bool {
    is_active && start_date <= now && now <= end_date
}

/// Validate the voting window of a new poll.
pub fn validate_window(start_date: Timestamp, end_date: Timestamp) -> Result<(), CoreError> {
    if end_date <= start_date {
        return Err(CoreError::Validation(
            "end_date must be after start_date".to_string(),
        ));
    }
    Ok(())
}

/// Validate a poll title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Poll title must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Poll title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate the candidate book list of a new poll: at least
/// [`MIN_CANDIDATES`] entries and no duplicates.
pub fn validate_candidates(book_ids: &[DbId]) -> Result<(), CoreError> {
    if book_ids.len() < MIN_CANDIDATES {
        return Err(CoreError::Validation(format!(
            "A poll needs at least {MIN_CANDIDATES} candidate books"
        )));
    }
    let mut seen = HashSet::with_capacity(book_ids.len());
    for id in book_ids {
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "Book {id} is listed more than once"
            )));
        }
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Vote bookkeeping
-------------------------------------------------------------------------- */

/// Counter adjustments required to move a user's vote to a new candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotePlan {
    /// Book whose candidate count loses one vote.
    pub decrement: Option<DbId>,
    /// Book whose candidate count gains one vote.
    pub increment: Option<DbId>,
}

impl VotePlan {
    /// True when nothing changes (re-voting for the same book).
    pub fn is_noop(&self) -> bool {
        self.decrement.is_none() && self.increment.is_none()
    }
}

/// Plan the counter changes for a user whose current vote is `previous`
/// choosing `chosen`.
pub fn plan_vote(previous: Option<DbId>, chosen: DbId) -> VotePlan {
    match previous {
        Some(prev) if prev == chosen => VotePlan {
            decrement: None,
            increment: None,
        },
        Some(prev) => VotePlan {
            decrement: Some(prev),
            increment: Some(chosen),
        },
        None => VotePlan {
            decrement: None,
            increment: Some(chosen),
        },
    }
}

/* --------------------------------------------------------------------------
Ranking
-------------------------------------------------------------------------- */

/// Vote tally for one candidate as loaded at close time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateTally {
    pub candidate_id: DbId,
    pub book_id: DbId,
    pub vote_count: i32,
}

/// Final placement of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedCandidate {
    pub candidate_id: DbId,
    pub book_id: DbId,
    pub vote_count: i32,
    pub rank: i32,
}

/// Rank candidates by vote count, highest first, starting at 1.
///
/// Equal counts are ordered by candidate id, i.e. the order in which the
/// candidates were added to the poll, so the outcome does not depend on
/// the order the rows were loaded in.
pub fn rank_candidates(tallies: &[CandidateTally]) -> Vec<RankedCandidate> {
    let mut sorted = tallies.to_vec();
    sorted.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then(a.candidate_id.cmp(&b.candidate_id))
    });
    sorted
        .into_iter()
        .zip(1..)
        .map(|(t, rank)| RankedCandidate {
            candidate_id: t.candidate_id,
            book_id: t.book_id,
            vote_count: t.vote_count,
            rank,
        })
        .collect()
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
