//! Repository for the `discussion_questions` table.

use sqlx::PgPool;
use bookclub_core::types::DbId;

use crate::models::discussion::{CreateDiscussionQuestion, DiscussionQuestion};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, book_id, question, breakpoint, sort_order, created_at, updated_at";

/// Provides CRUD operations for discussion questions.
pub struct DiscussionRepo;

impl DiscussionRepo {
    /// Insert a new question for a book, returning the created row.
    pub async fn create(
        pool: &PgPool,
        book_id: DbId,
        input: &CreateDiscussionQuestion,
    ) -> Result<DiscussionQuestion, sqlx::Error> {
        let query = format!(
            "INSERT INTO discussion_questions (book_id, question, breakpoint, sort_order)
             VALUES ($1, $2, $3, COALESCE($4, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscussionQuestion>(&query)
            .bind(book_id)
            .bind(input.question.trim())
            .bind(input.breakpoint)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a question by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DiscussionQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM discussion_questions WHERE id = $1");
        sqlx::query_as::<_, DiscussionQuestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all questions for a book, ordered by breakpoint then sort order.
    pub async fn list_for_book(
        pool: &PgPool,
        book_id: DbId,
    ) -> Result<Vec<DiscussionQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discussion_questions
             WHERE book_id = $1
             ORDER BY breakpoint ASC, sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, DiscussionQuestion>(&query)
            .bind(book_id)
            .fetch_all(pool)
            .await
    }

    /// `(id, breakpoint)` pairs for a book, in the same order as
    /// [`Self::list_for_book`].
    pub async fn breakpoints_for_book(
        pool: &PgPool,
        book_id: DbId,
    ) -> Result<Vec<(DbId, i32)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, breakpoint FROM discussion_questions
             WHERE book_id = $1
             ORDER BY breakpoint ASC, sort_order ASC, id ASC",
        )
        .bind(book_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a question (and, by cascade, its comments).
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM discussion_questions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
