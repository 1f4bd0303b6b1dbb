//! Repository for the `books` table.

use sqlx::PgPool;
use bookclub_core::types::DbId;

use crate::models::book::{Book, CreateBook, UpdateBook};
use crate::models::status::StatusId;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, title, author, description, cover_url, page_count, \
                                  status_id, reading_month, created_at, updated_at";

/// Provides CRUD operations for books.
pub struct BookRepo;

impl BookRepo {
    /// Insert a new book in Draft status, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBook) -> Result<Book, sqlx::Error> {
        let query = format!(
            "INSERT INTO books (title, author, description, cover_url, page_count)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(input.title.trim())
            .bind(input.author.trim())
            .bind(&input.description)
            .bind(&input.cover_url)
            .bind(input.page_count)
            .fetch_one(pool)
            .await
    }

    /// Find a book by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List books, optionally restricted to one status, ordered by title.
    pub async fn list(pool: &PgPool, status_id: Option<StatusId>) -> Result<Vec<Book>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM books
             WHERE ($1::SMALLINT IS NULL OR status_id = $1)
             ORDER BY title ASC, id ASC"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(status_id)
            .fetch_all(pool)
            .await
    }

    /// Update a book. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBook,
        status_id: Option<StatusId>,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                description = COALESCE($4, description),
                cover_url = COALESCE($5, cover_url),
                page_count = COALESCE($6, page_count),
                status_id = COALESCE($7, status_id),
                reading_month = COALESCE($8, reading_month)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(input.author.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.cover_url)
            .bind(input.page_count)
            .bind(status_id)
            .bind(&input.reading_month)
            .fetch_optional(pool)
            .await
    }
}
