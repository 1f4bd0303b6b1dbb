//! Repository for the `users` table, including streak bookkeeping.

use sqlx::PgPool;
use bookclub_core::roles::ROLE_MEMBER;
use bookclub_core::streak::{self, IsoWeekId, StreakState};
use bookclub_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, StreakUpdate, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, display_name, email, role, current_streak, longest_streak, \
                       last_active_week, created_at, updated_at";

/// Provides CRUD operations for users and the weekly streak transition.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// If `role` is `None`, defaults to `member`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (display_name, email, role)
             VALUES ($1, $2, COALESCE($3, '{ROLE_MEMBER}'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.display_name)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record one qualifying activity at `now` against the user's streak.
    ///
    /// The user row is locked for the duration of the transaction so two
    /// activities arriving together cannot both extend the streak. Returns
    /// `None` if the user does not exist.
    pub async fn record_activity(
        pool: &PgPool,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<StreakUpdate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Option<(i32, i32, Option<String>)> = sqlx::query_as(
            "SELECT current_streak, longest_streak, last_active_week
             FROM users WHERE id = $1
             FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((current_streak, longest_streak, last_active_week)) = row else {
            return Ok(None);
        };

        let state = StreakState {
            current_streak,
            longest_streak,
            last_active_week: parse_stored_week(user_id, last_active_week.as_deref()),
        };
        let current_week = IsoWeekId::containing(now);
        let (next, transition) = streak::advance(state, current_week);

        if transition.is_new_week() {
            sqlx::query(
                "UPDATE users SET
                    current_streak = $2,
                    longest_streak = $3,
                    last_active_week = $4
                 WHERE id = $1",
            )
            .bind(user_id)
            .bind(next.current_streak)
            .bind(next.longest_streak)
            .bind(current_week.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            user_id,
            week = %current_week,
            ?transition,
            current_streak = next.current_streak,
            "Streak activity recorded"
        );

        Ok(Some(StreakUpdate {
            current_streak: next.current_streak,
            longest_streak: next.longest_streak,
            is_new_week: transition.is_new_week(),
        }))
    }
}

/// Parse a stored week identifier. A malformed value is treated as no
/// previous activity, which restarts the streak at 1.
pub(crate) fn parse_stored_week(user_id: DbId, stored: Option<&str>) -> Option<IsoWeekId> {
    let raw = stored?;
    match raw.parse() {
        Ok(week) => Some(week),
        Err(e) => {
            tracing::warn!(user_id, stored = raw, error = %e, "Ignoring malformed last_active_week");
            None
        }
    }
}
