//! Repository for the `comments` table.

use sqlx::PgPool;
use bookclub_core::types::DbId;

use crate::models::comment::{Comment, CommentThread, CommentWithAuthor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, book_id, discussion_id, parent_id, content, created_at, updated_at";

/// Provides create and read operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning the created row.
    ///
    /// `content` must already be validated and trimmed.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        book_id: DbId,
        discussion_id: Option<DbId>,
        parent_id: Option<DbId>,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (user_id, book_id, discussion_id, parent_id, content)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(user_id)
            .bind(book_id)
            .bind(discussion_id)
            .bind(parent_id)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// Find a comment by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a discussion's comments as threads: top-level comments in
    /// creation order, each with its replies in creation order.
    pub async fn list_threads(
        pool: &PgPool,
        discussion_id: DbId,
    ) -> Result<Vec<CommentThread>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CommentWithAuthor>(
            "SELECT c.id, c.user_id, u.display_name AS author_name, c.book_id,
                    c.discussion_id, c.parent_id, c.content, c.created_at
             FROM comments c
             INNER JOIN users u ON u.id = c.user_id
             WHERE c.discussion_id = $1
             ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(discussion_id)
        .fetch_all(pool)
        .await?;

        Ok(group_threads(rows))
    }
}

/// Nest replies under their top-level comment. Replies to replies are
/// attached to the root of their chain; orphans are dropped.
fn group_threads(rows: Vec<CommentWithAuthor>) -> Vec<CommentThread> {
    let mut threads: Vec<CommentThread> = Vec::new();
    let mut root_of: std::collections::HashMap<DbId, usize> = std::collections::HashMap::new();

    for row in rows {
        match row.parent_id {
            None => {
                root_of.insert(row.id, threads.len());
                threads.push(CommentThread {
                    comment: row,
                    replies: Vec::new(),
                });
            }
            Some(parent) => {
                if let Some(&idx) = root_of.get(&parent) {
                    root_of.insert(row.id, idx);
                    threads[idx].replies.push(row);
                }
            }
        }
    }
    threads
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row(id: DbId, parent_id: Option<DbId>) -> CommentWithAuthor {
        CommentWithAuthor {
            id,
            user_id: 1,
            author_name: "Ada".to_string(),
            book_id: 1,
            discussion_id: Some(1),
            parent_id,
            content: format!("comment {id}"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_replies_nest_under_root() {
        let threads = group_threads(vec![row(1, None), row(2, Some(1)), row(3, None), row(4, Some(2))]);
        assert_eq!(threads.len(), 2);
        let reply_ids: Vec<_> = threads[0].replies.iter().map(|r| r.id).collect();
        assert_eq!(reply_ids, vec![2, 4]);
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn test_orphan_replies_are_dropped() {
        let threads = group_threads(vec![row(5, Some(99)), row(6, None)]);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.id, 6);
    }
}
