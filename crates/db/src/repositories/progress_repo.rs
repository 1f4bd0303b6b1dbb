//! Repository for the `reading_progress` table.

use sqlx::PgPool;
use bookclub_core::types::DbId;

use crate::models::progress::{ProgressWrite, ReadingProgress};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, book_id, progress, is_finished, created_at, updated_at";

/// Provides reads and the monotonic write for reading progress.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Find a user's progress on a book.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        book_id: DbId,
    ) -> Result<Option<ReadingProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reading_progress WHERE user_id = $1 AND book_id = $2"
        );
        sqlx::query_as::<_, ReadingProgress>(&query)
            .bind(user_id)
            .bind(book_id)
            .fetch_optional(pool)
            .await
    }

    /// List all of a user's progress rows, most recently updated first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ReadingProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reading_progress
             WHERE user_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, ReadingProgress>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Store `submitted` as the user's progress unless a larger value is
    /// already stored.
    ///
    /// The row is created first (at zero) if missing, so there is always a
    /// row to lock before the previous value is read. Only the transaction
    /// whose insert created the row reports `previous = None`; every other
    /// writer sees the committed value under the lock. `is_finished` is
    /// always derived from the stored progress.
    pub async fn record(
        pool: &PgPool,
        user_id: DbId,
        book_id: DbId,
        submitted: i32,
    ) -> Result<ProgressWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let inserted: Option<DbId> = sqlx::query_scalar(
            "INSERT INTO reading_progress (user_id, book_id, progress, is_finished)
             VALUES ($1, $2, 0, false)
             ON CONFLICT (user_id, book_id) DO NOTHING
             RETURNING id",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let stored: i32 = sqlx::query_scalar(
            "SELECT progress FROM reading_progress
             WHERE user_id = $1 AND book_id = $2
             FOR UPDATE",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        let previous = match inserted {
            Some(_) => None,
            None => Some(stored),
        };

        let query = format!(
            "UPDATE reading_progress SET
                progress = GREATEST(progress, $3),
                is_finished = GREATEST(progress, $3) >= 100
             WHERE user_id = $1 AND book_id = $2
             RETURNING {COLUMNS}"
        );
        let current = sqlx::query_as::<_, ReadingProgress>(&query)
            .bind(user_id)
            .bind(book_id)
            .bind(submitted)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ProgressWrite { previous, current })
    }
}
