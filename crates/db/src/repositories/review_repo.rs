//! Repository for the `reviews` table.

use sqlx::PgPool;
use bookclub_core::types::DbId;

use crate::models::review::Review;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, book_id, rating, content, created_at, updated_at";

/// Provides create/update and read operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Write the user's review of a book, replacing an earlier one.
    ///
    /// `content` must already be validated and trimmed.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        book_id: DbId,
        rating: i16,
        content: &str,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (user_id, book_id, rating, content)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, book_id) DO UPDATE SET
                rating = EXCLUDED.rating,
                content = EXCLUDED.content
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(user_id)
            .bind(book_id)
            .bind(rating)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// Find a review by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all reviews of a book, newest first.
    pub async fn list_for_book(pool: &PgPool, book_id: DbId) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews
             WHERE book_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(book_id)
            .fetch_all(pool)
            .await
    }
}
