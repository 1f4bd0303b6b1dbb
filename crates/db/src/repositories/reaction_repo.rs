//! Repository for the `reactions` table.

use sqlx::PgPool;
use bookclub_core::reaction::ReactionType;
use bookclub_core::types::DbId;

use crate::models::reaction::{Reaction, ReactionTarget};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, comment_id, review_id, reaction_type, created_at";

/// Provides add/remove operations for reactions.
pub struct ReactionRepo;

impl ReactionRepo {
    /// Add a reaction. Re-adding an existing reaction returns the existing
    /// row; the boolean is `true` only when a new row was inserted.
    pub async fn add(
        pool: &PgPool,
        user_id: DbId,
        target: ReactionTarget,
        reaction_type: ReactionType,
    ) -> Result<(Reaction, bool), sqlx::Error> {
        let (comment_id, review_id) = target_columns(target);
        let conflict_target = match target {
            ReactionTarget::Comment(_) => {
                "(user_id, comment_id, reaction_type) WHERE comment_id IS NOT NULL"
            }
            ReactionTarget::Review(_) => {
                "(user_id, review_id, reaction_type) WHERE review_id IS NOT NULL"
            }
        };

        let insert = format!(
            "INSERT INTO reactions (user_id, comment_id, review_id, reaction_type)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT {conflict_target} DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Reaction>(&insert)
            .bind(user_id)
            .bind(comment_id)
            .bind(review_id)
            .bind(reaction_type.as_str())
            .fetch_optional(pool)
            .await?;

        if let Some(row) = inserted {
            return Ok((row, true));
        }

        let select = format!(
            "SELECT {COLUMNS} FROM reactions
             WHERE user_id = $1
               AND comment_id IS NOT DISTINCT FROM $2
               AND review_id IS NOT DISTINCT FROM $3
               AND reaction_type = $4"
        );
        let existing = sqlx::query_as::<_, Reaction>(&select)
            .bind(user_id)
            .bind(comment_id)
            .bind(review_id)
            .bind(reaction_type.as_str())
            .fetch_one(pool)
            .await?;
        Ok((existing, false))
    }

    /// Remove the user's reaction of the given type.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn remove(
        pool: &PgPool,
        user_id: DbId,
        target: ReactionTarget,
        reaction_type: ReactionType,
    ) -> Result<bool, sqlx::Error> {
        let (comment_id, review_id) = target_columns(target);
        let result = sqlx::query(
            "DELETE FROM reactions
             WHERE user_id = $1
               AND comment_id IS NOT DISTINCT FROM $2
               AND review_id IS NOT DISTINCT FROM $3
               AND reaction_type = $4",
        )
        .bind(user_id)
        .bind(comment_id)
        .bind(review_id)
        .bind(reaction_type.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all reactions on a target, oldest first.
    pub async fn list_for_target(
        pool: &PgPool,
        target: ReactionTarget,
    ) -> Result<Vec<Reaction>, sqlx::Error> {
        let (comment_id, review_id) = target_columns(target);
        let query = format!(
            "SELECT {COLUMNS} FROM reactions
             WHERE comment_id IS NOT DISTINCT FROM $1
               AND review_id IS NOT DISTINCT FROM $2
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Reaction>(&query)
            .bind(comment_id)
            .bind(review_id)
            .fetch_all(pool)
            .await
    }
}

fn target_columns(target: ReactionTarget) -> (Option<DbId>, Option<DbId>) {
    match target {
        ReactionTarget::Comment(id) => (Some(id), None),
        ReactionTarget::Review(id) => (None, Some(id)),
    }
}
