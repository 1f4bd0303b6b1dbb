//! Repository for `user_badges` and the counters badge rules read.

use std::collections::HashSet;

use sqlx::{FromRow, PgPool};
use bookclub_core::badges::{self, BadgeCounters, BadgeType};
use bookclub_core::reaction::ReactionType;
use bookclub_core::types::DbId;

use crate::models::badge::UserBadge;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, badge_type_id, is_pinned, awarded_at";

/// Provides badge evaluation, listing and pinning.
pub struct BadgeRepo;

#[derive(FromRow)]
struct CounterRow {
    books_started: i64,
    books_finished: i64,
    reviews: i64,
    comments: i64,
    helpful_received: i64,
    insightful_received: i64,
    current_streak: i32,
}

impl BadgeRepo {
    /// Badge types already awarded to a user.
    pub async fn awarded_types(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<HashSet<BadgeType>, sqlx::Error> {
        let ids: Vec<i16> =
            sqlx::query_scalar("SELECT badge_type_id FROM user_badges WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?;
        Ok(ids.into_iter().filter_map(BadgeType::from_id).collect())
    }

    /// Compute every badge counter for a user from the underlying rows.
    ///
    /// The streak is read from the persisted user row, not recomputed.
    pub async fn counters(pool: &PgPool, user_id: DbId) -> Result<BadgeCounters, sqlx::Error> {
        let row = sqlx::query_as::<_, CounterRow>(
            "SELECT
                (SELECT COUNT(*) FROM reading_progress WHERE user_id = $1) AS books_started,
                (SELECT COUNT(*) FROM reading_progress
                  WHERE user_id = $1 AND is_finished) AS books_finished,
                (SELECT COUNT(*) FROM reviews WHERE user_id = $1) AS reviews,
                (SELECT COUNT(*) FROM comments WHERE user_id = $1) AS comments,
                (SELECT COUNT(*) FROM reactions r
                  LEFT JOIN comments c ON c.id = r.comment_id
                  LEFT JOIN reviews v ON v.id = r.review_id
                  WHERE r.reaction_type = $2
                    AND (c.user_id = $1 OR v.user_id = $1)) AS helpful_received,
                (SELECT COUNT(*) FROM reactions r
                  LEFT JOIN comments c ON c.id = r.comment_id
                  LEFT JOIN reviews v ON v.id = r.review_id
                  WHERE r.reaction_type = $3
                    AND (c.user_id = $1 OR v.user_id = $1)) AS insightful_received,
                COALESCE((SELECT current_streak FROM users WHERE id = $1), 0) AS current_streak",
        )
        .bind(user_id)
        .bind(ReactionType::Helpful.as_str())
        .bind(ReactionType::Insightful.as_str())
        .fetch_one(pool)
        .await?;

        Ok(BadgeCounters {
            books_started: row.books_started,
            books_finished: row.books_finished,
            reviews: row.reviews,
            comments: row.comments,
            helpful_received: row.helpful_received,
            insightful_received: row.insightful_received,
            current_streak: i64::from(row.current_streak),
        })
    }

    /// Evaluate every badge rule for a user and award the ones newly met.
    ///
    /// Returns only the badges this call inserted. A concurrent evaluation
    /// that awarded the same badge first is absorbed by the unique
    /// `(user_id, badge_type_id)` constraint and not reported twice.
    pub async fn check_and_award(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<BadgeType>, sqlx::Error> {
        let awarded = Self::awarded_types(pool, user_id).await?;
        let counters = Self::counters(pool, user_id).await?;
        let candidates = badges::newly_earned(&counters, &awarded);

        let mut new_badges = Vec::with_capacity(candidates.len());
        for badge in candidates {
            let inserted: Option<DbId> = sqlx::query_scalar(
                "INSERT INTO user_badges (user_id, badge_type_id)
                 VALUES ($1, $2)
                 ON CONFLICT ON CONSTRAINT uq_user_badges_user_badge DO NOTHING
                 RETURNING id",
            )
            .bind(user_id)
            .bind(badge.id())
            .fetch_optional(pool)
            .await?;

            if inserted.is_some() {
                tracing::info!(user_id, badge = badge.code(), "Badge awarded");
                new_badges.push(badge);
            }
        }

        if new_badges.is_empty() {
            tracing::debug!(user_id, "No new badges");
        }
        Ok(new_badges)
    }

    /// List a user's awards, pinned first, then most recent.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserBadge>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_badges
             WHERE user_id = $1
             ORDER BY is_pinned DESC, awarded_at DESC, id DESC"
        );
        sqlx::query_as::<_, UserBadge>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Pin one of the user's awards and unpin every other.
    ///
    /// Returns `None` if the award does not exist or belongs to someone
    /// else. The user row lock serializes concurrent pins by one user.
    pub async fn pin(
        pool: &PgPool,
        user_id: DbId,
        award_id: DbId,
    ) -> Result<Option<UserBadge>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_badges WHERE id = $1 AND user_id = $2)",
        )
        .bind(award_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if !owned {
            return Ok(None);
        }

        sqlx::query(
            "UPDATE user_badges SET is_pinned = false
             WHERE user_id = $1 AND is_pinned AND id <> $2",
        )
        .bind(user_id)
        .bind(award_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE user_badges SET is_pinned = true WHERE id = $1 RETURNING {COLUMNS}"
        );
        let badge = sqlx::query_as::<_, UserBadge>(&query)
            .bind(award_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id, award_id, "Badge pinned");
        Ok(Some(badge))
    }

    /// Unpin one of the user's awards. Returns `None` if it is not theirs.
    pub async fn unpin(
        pool: &PgPool,
        user_id: DbId,
        award_id: DbId,
    ) -> Result<Option<UserBadge>, sqlx::Error> {
        let query = format!(
            "UPDATE user_badges SET is_pinned = false
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserBadge>(&query)
            .bind(award_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
