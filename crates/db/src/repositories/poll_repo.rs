//! Repository for `polls`, `poll_candidates`, and `votes`.
//!
//! `poll_candidates.vote_count` is a denormalized count of `votes` rows.
//! It is only ever changed here, by `vote_count = vote_count +/- 1` inside
//! the same transaction that writes the matching `votes` row, so the two
//! can never drift apart.
//!
//! Lock order for every ledger transaction: the poll row first (`FOR SHARE`
//! when voting, `FOR UPDATE` when closing), then the caller's vote row,
//! then candidate rows. Closing therefore waits for in-flight votes and
//! votes that start after a close see `is_active = false`.

use sqlx::{PgConnection, PgPool};
use bookclub_core::poll::{self, CandidateTally};
use bookclub_core::types::{DbId, Timestamp};

use crate::models::book::Book;
use crate::models::poll::{
    CandidateWithBook, CastVoteOutcome, ClosePollOutcome, ClosedPoll, CreatePoll, Poll,
    PollCandidate, RemoveVoteOutcome, Vote,
};
use crate::models::status::BookStatus;
use crate::repositories::book_repo;

/// Column list for polls queries.
const POLL_COLUMNS: &str =
    "id, title, start_date, end_date, for_month, is_active, created_at, updated_at";

/// Column list for poll_candidates queries.
const CANDIDATE_COLUMNS: &str = "id, poll_id, book_id, vote_count, rank";

/// Column list for votes queries.
const VOTE_COLUMNS: &str = "id, user_id, poll_id, book_id, created_at, updated_at";

/// Provides poll administration and the vote ledger.
pub struct PollRepo;

impl PollRepo {
    /* ----------------------------------------------------------------------
       Administration and reads
       ---------------------------------------------------------------------- */

    /// Create a poll and its candidates in one transaction.
    ///
    /// Candidates are inserted in `input.book_ids` order, which is also the
    /// tie-break order at close. Candidate books move to Nominated.
    pub async fn create(pool: &PgPool, input: &CreatePoll) -> Result<Poll, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO polls (title, start_date, end_date, for_month)
             VALUES ($1, $2, $3, $4)
             RETURNING {POLL_COLUMNS}"
        );
        let poll = sqlx::query_as::<_, Poll>(&query)
            .bind(input.title.trim())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.for_month)
            .fetch_one(&mut *tx)
            .await?;

        for &book_id in &input.book_ids {
            sqlx::query("INSERT INTO poll_candidates (poll_id, book_id) VALUES ($1, $2)")
                .bind(poll.id)
                .bind(book_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE books SET status_id = $1 WHERE id = ANY($2)")
            .bind(BookStatus::Nominated.id())
            .bind(&input.book_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(poll)
    }

    /// Find a poll by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Poll>, sqlx::Error> {
        let query = format!("SELECT {POLL_COLUMNS} FROM polls WHERE id = $1");
        sqlx::query_as::<_, Poll>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all polls, active ones first, newest first within each group.
    pub async fn list(pool: &PgPool) -> Result<Vec<Poll>, sqlx::Error> {
        let query = format!(
            "SELECT {POLL_COLUMNS} FROM polls
             ORDER BY is_active DESC, start_date DESC, id DESC"
        );
        sqlx::query_as::<_, Poll>(&query).fetch_all(pool).await
    }

    /// List a poll's candidates with book details. Closed polls are
    /// ordered by rank, open ones by creation order.
    pub async fn list_candidates(
        pool: &PgPool,
        poll_id: DbId,
    ) -> Result<Vec<CandidateWithBook>, sqlx::Error> {
        sqlx::query_as::<_, CandidateWithBook>(
            "SELECT pc.id, pc.book_id, b.title, b.author, pc.vote_count, pc.rank
             FROM poll_candidates pc
             INNER JOIN books b ON b.id = pc.book_id
             WHERE pc.poll_id = $1
             ORDER BY pc.rank ASC NULLS LAST, pc.id ASC",
        )
        .bind(poll_id)
        .fetch_all(pool)
        .await
    }

    /// Find a user's vote in a poll.
    pub async fn find_vote(
        pool: &PgPool,
        user_id: DbId,
        poll_id: DbId,
    ) -> Result<Option<Vote>, sqlx::Error> {
        let query =
            format!("SELECT {VOTE_COLUMNS} FROM votes WHERE user_id = $1 AND poll_id = $2");
        sqlx::query_as::<_, Vote>(&query)
            .bind(user_id)
            .bind(poll_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of votes rows in a poll.
    pub async fn count_votes(pool: &PgPool, poll_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE poll_id = $1")
            .bind(poll_id)
            .fetch_one(pool)
            .await
    }

    /* ----------------------------------------------------------------------
       Vote ledger
       ---------------------------------------------------------------------- */

    /// Cast or change the user's vote in a poll.
    ///
    /// Atomically: the previous candidate (if different) loses one vote,
    /// the vote row is created or re-pointed, and the chosen candidate
    /// gains one vote. Re-voting for the same book changes nothing.
    pub async fn cast_vote(
        pool: &PgPool,
        user_id: DbId,
        poll_id: DbId,
        book_id: DbId,
        now: Timestamp,
    ) -> Result<CastVoteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(poll) = lock_poll(&mut *tx, poll_id, LockMode::Share).await? else {
            return Ok(CastVoteOutcome::PollNotFound);
        };
        if !poll::is_open(poll.start_date, poll.end_date, poll.is_active, now) {
            return Ok(CastVoteOutcome::PollNotOpen);
        }

        let is_candidate: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM poll_candidates WHERE poll_id = $1 AND book_id = $2
             )",
        )
        .bind(poll_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;
        if !is_candidate {
            return Ok(CastVoteOutcome::NotACandidate);
        }

        let existing = lock_vote(&mut *tx, user_id, poll_id).await?;
        let plan = poll::plan_vote(existing.as_ref().map(|v| v.book_id), book_id);

        if let (true, Some(vote)) = (plan.is_noop(), existing.as_ref()) {
            // Re-vote for the current choice.
            let vote = vote.clone();
            tx.commit().await?;
            return Ok(CastVoteOutcome::Recorded {
                vote,
                changed: false,
            });
        }

        let vote = match existing {
            Some(existing) => {
                let query = format!(
                    "UPDATE votes SET book_id = $2 WHERE id = $1 RETURNING {VOTE_COLUMNS}"
                );
                sqlx::query_as::<_, Vote>(&query)
                    .bind(existing.id)
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let query = format!(
                    "INSERT INTO votes (user_id, poll_id, book_id)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (user_id, poll_id) DO NOTHING
                     RETURNING {VOTE_COLUMNS}"
                );
                let inserted = sqlx::query_as::<_, Vote>(&query)
                    .bind(user_id)
                    .bind(poll_id)
                    .bind(book_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                match inserted {
                    Some(vote) => vote,
                    None => {
                        // A concurrent first vote by the same user won the
                        // insert; nothing has been changed in this tx.
                        tx.rollback().await?;
                        return Ok(CastVoteOutcome::Contended);
                    }
                }
            }
        };

        // Candidate rows are updated in book id order so two users swapping
        // votes in opposite directions cannot deadlock.
        let mut adjustments: Vec<(DbId, i32)> = plan
            .decrement
            .map(|b| (b, -1))
            .into_iter()
            .chain(plan.increment.map(|b| (b, 1)))
            .collect();
        adjustments.sort_unstable();
        for (candidate_book, delta) in adjustments {
            adjust_count(&mut *tx, poll_id, candidate_book, delta).await?;
        }

        tx.commit().await?;

        tracing::info!(
            user_id,
            poll_id,
            book_id,
            previous_book_id = ?plan.decrement,
            "Vote recorded"
        );

        Ok(CastVoteOutcome::Recorded {
            vote,
            changed: true,
        })
    }

    /// Remove the user's vote from a poll and release its count.
    pub async fn remove_vote(
        pool: &PgPool,
        user_id: DbId,
        poll_id: DbId,
        now: Timestamp,
    ) -> Result<RemoveVoteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(poll) = lock_poll(&mut *tx, poll_id, LockMode::Share).await? else {
            return Ok(RemoveVoteOutcome::PollNotFound);
        };
        if !poll::is_open(poll.start_date, poll.end_date, poll.is_active, now) {
            return Ok(RemoveVoteOutcome::PollNotOpen);
        }

        let Some(vote) = lock_vote(&mut *tx, user_id, poll_id).await? else {
            return Ok(RemoveVoteOutcome::NoVote);
        };

        sqlx::query("DELETE FROM votes WHERE id = $1")
            .bind(vote.id)
            .execute(&mut *tx)
            .await?;
        adjust_count(&mut *tx, poll_id, vote.book_id, -1).await?;

        tx.commit().await?;

        tracing::info!(user_id, poll_id, book_id = vote.book_id, "Vote removed");

        Ok(RemoveVoteOutcome::Removed(vote))
    }

    /// Close an active poll: rank candidates, deactivate the poll, schedule
    /// the winning book for the poll's month and return the other
    /// candidates to Draft. All or nothing.
    pub async fn close(pool: &PgPool, poll_id: DbId) -> Result<ClosePollOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(poll) = lock_poll(&mut *tx, poll_id, LockMode::Update).await? else {
            return Ok(ClosePollOutcome::PollNotFound);
        };
        if !poll.is_active {
            return Ok(ClosePollOutcome::AlreadyClosed);
        }

        let tallies: Vec<(DbId, DbId, i32)> = sqlx::query_as(
            "SELECT id, book_id, vote_count FROM poll_candidates
             WHERE poll_id = $1
             ORDER BY id ASC
             FOR UPDATE",
        )
        .bind(poll_id)
        .fetch_all(&mut *tx)
        .await?;

        let tallies: Vec<CandidateTally> = tallies
            .into_iter()
            .map(|(candidate_id, book_id, vote_count)| CandidateTally {
                candidate_id,
                book_id,
                vote_count,
            })
            .collect();
        if tallies.is_empty() {
            return Ok(ClosePollOutcome::NoCandidates);
        }
        let ranked = poll::rank_candidates(&tallies);

        let mut candidates = Vec::with_capacity(ranked.len());
        for r in &ranked {
            let query = format!(
                "UPDATE poll_candidates SET rank = $2 WHERE id = $1 RETURNING {CANDIDATE_COLUMNS}"
            );
            let candidate = sqlx::query_as::<_, PollCandidate>(&query)
                .bind(r.candidate_id)
                .bind(r.rank)
                .fetch_one(&mut *tx)
                .await?;
            candidates.push(candidate);
        }

        let query = format!(
            "UPDATE polls SET is_active = false WHERE id = $1 RETURNING {POLL_COLUMNS}"
        );
        let poll = sqlx::query_as::<_, Poll>(&query)
            .bind(poll_id)
            .fetch_one(&mut *tx)
            .await?;

        let winner = match ranked.first() {
            Some(first) => {
                let query = format!(
                    "UPDATE books SET status_id = $2, reading_month = $3
                     WHERE id = $1
                     RETURNING {}",
                    book_repo::COLUMNS
                );
                let book = sqlx::query_as::<_, Book>(&query)
                    .bind(first.book_id)
                    .bind(BookStatus::Scheduled.id())
                    .bind(&poll.for_month)
                    .fetch_one(&mut *tx)
                    .await?;
                Some(book)
            }
            None => None,
        };

        let others: Vec<DbId> = ranked.iter().skip(1).map(|r| r.book_id).collect();
        if !others.is_empty() {
            sqlx::query("UPDATE books SET status_id = $1 WHERE id = ANY($2)")
                .bind(BookStatus::Draft.id())
                .bind(&others)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            poll_id,
            winner_book_id = ?winner.as_ref().map(|b| b.id),
            candidate_count = candidates.len(),
            "Poll closed"
        );

        Ok(ClosePollOutcome::Closed(ClosedPoll {
            poll,
            candidates,
            winner,
        }))
    }
}

/* --------------------------------------------------------------------------
   Transaction helpers
   -------------------------------------------------------------------------- */

#[derive(Clone, Copy)]
enum LockMode {
    Share,
    Update,
}

async fn lock_poll(
    conn: &mut PgConnection,
    poll_id: DbId,
    mode: LockMode,
) -> Result<Option<Poll>, sqlx::Error> {
    let lock = match mode {
        LockMode::Share => "FOR SHARE",
        LockMode::Update => "FOR UPDATE",
    };
    let query = format!("SELECT {POLL_COLUMNS} FROM polls WHERE id = $1 {lock}");
    sqlx::query_as::<_, Poll>(&query)
        .bind(poll_id)
        .fetch_optional(conn)
        .await
}

async fn lock_vote(
    conn: &mut PgConnection,
    user_id: DbId,
    poll_id: DbId,
) -> Result<Option<Vote>, sqlx::Error> {
    let query = format!(
        "SELECT {VOTE_COLUMNS} FROM votes
         WHERE user_id = $1 AND poll_id = $2
         FOR UPDATE"
    );
    sqlx::query_as::<_, Vote>(&query)
        .bind(user_id)
        .bind(poll_id)
        .fetch_optional(conn)
        .await
}

async fn adjust_count(
    conn: &mut PgConnection,
    poll_id: DbId,
    book_id: DbId,
    delta: i32,
) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        "UPDATE poll_candidates SET vote_count = vote_count + $3
         WHERE poll_id = $1 AND book_id = $2",
    )
    .bind(poll_id)
    .bind(book_id)
    .bind(delta)
    .execute(conn)
    .await?;

    if result.rows_affected() != 1 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}
