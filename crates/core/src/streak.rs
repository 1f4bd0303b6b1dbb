//! Weekly activity streaks keyed by ISO-8601 week.
//!
//! A user's streak counts consecutive ISO weeks with at least one
//! qualifying activity. Weeks are identified as `YYYY-Www` (for example
//! `2024-W42`), using ISO week numbering: week 1 is the week that contains
//! the year's first Thursday.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Highest week number an ISO year can have.
pub const MAX_ISO_WEEK: u32 = 53;

/// Lowest week number of the previous year that may roll over into week 1.
///
/// This does not check whether the previous year actually had 53 weeks, so
/// `2020-W52 -> 2021-W01` counts as consecutive even though 2020 had a
/// week 53 in between.
pub const YEAR_ROLLOVER_MIN_WEEK: u32 = 52;

/* --------------------------------------------------------------------------
ISO week identifier
-------------------------------------------------------------------------- */

/// An ISO-8601 week, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeekId {
    year: i32,
    week: u32,
}

impl IsoWeekId {
    pub fn new(year: i32, week: u32) -> Result<Self, CoreError> {
        if !(1..=MAX_ISO_WEEK).contains(&week) {
            return Err(CoreError::Validation(format!(
                "ISO week must be between 1 and {MAX_ISO_WEEK}, got {week}"
            )));
        }
        if !(0..=9999).contains(&year) {
            return Err(CoreError::Validation(format!(
                "ISO week year must have four digits, got {year}"
            )));
        }
        Ok(Self { year, week })
    }

    /// The ISO week containing `at`.
    pub fn containing(at: Timestamp) -> Self {
        let iso = at.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    /// Whether `later` is the week directly after `self`.
    pub fn is_followed_by(&self, later: IsoWeekId) -> bool {
        if later.year == self.year {
            return later.week == self.week + 1;
        }
        later.year == self.year + 1 && later.week == 1 && self.week >= YEAR_ROLLOVER_MIN_WEEK
    }
}

impl fmt::Display for IsoWeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.year, self.week)
    }
}

impl FromStr for IsoWeekId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation(format!("Invalid ISO week '{s}'. Expected YYYY-Www"));

        let (year, week) = s.split_once("-W").ok_or_else(invalid)?;
        if year.len() != 4 || week.len() != 2 {
            return Err(invalid());
        }
        if !year.chars().chain(week.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;
        Self::new(year, week)
    }
}

impl Serialize for IsoWeekId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/* --------------------------------------------------------------------------
Streak state machine
-------------------------------------------------------------------------- */

/// Persisted streak fields of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakState {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_active_week: Option<IsoWeekId>,
}

/// Which row of the transition table applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    /// First activity ever.
    Started,
    /// Already active this week; nothing changes.
    SameWeek,
    /// Active last week; the streak grows.
    Continued,
    /// A gap (or a clock that went backwards); the streak restarts at 1.
    Reset,
}

impl StreakTransition {
    /// True for every transition that must be persisted.
    pub fn is_new_week(self) -> bool {
        self != StreakTransition::SameWeek
    }
}

/// Apply one activity in `current_week` to `state`.
pub fn advance(state: StreakState, current_week: IsoWeekId) -> (StreakState, StreakTransition) {
    let (current_streak, transition) = match state.last_active_week {
        None => (1, StreakTransition::Started),
        Some(last) if last == current_week => return (state, StreakTransition::SameWeek),
        Some(last) if last.is_followed_by(current_week) => {
            (state.current_streak + 1, StreakTransition::Continued)
        }
        Some(_) => (1, StreakTransition::Reset),
    };

    let next = StreakState {
        current_streak,
        longest_streak: state.longest_streak.max(current_streak),
        last_active_week: Some(current_week),
    };
    (next, transition)
}

/// Whether a streak ending at `last_active_week` is still alive in
/// `current_week` (active this week or last week).
pub fn is_active(last_active_week: Option<IsoWeekId>, current_week: IsoWeekId) -> bool {
    match last_active_week {
        Some(last) => last == current_week || last.is_followed_by(current_week),
        None => false,
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
