//! Reading progress rules and the discussion gate.
//!
//! A reader's progress on a book is an integer percentage that never goes
//! backwards. Discussion questions carry a breakpoint; a question is
//! unlocked once the reader's progress reaches it.

use crate::error::CoreError;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Lowest accepted progress value.
pub const MIN_PROGRESS: i32 = 0;

/// Highest accepted progress value. Reaching it marks the book finished.
pub const MAX_PROGRESS: i32 = 100;

/// Lowest accepted discussion breakpoint.
pub const MIN_BREAKPOINT: i32 = 1;

/// Highest accepted discussion breakpoint.
pub const MAX_BREAKPOINT: i32 = 100;

/* --------------------------------------------------------------------------
Validation
-------------------------------------------------------------------------- */

/// Validate a submitted progress percentage.
pub fn validate_progress(progress: i64) -> Result<i32, CoreError> {
    if !(i64::from(MIN_PROGRESS)..=i64::from(MAX_PROGRESS)).contains(&progress) {
        return Err(CoreError::Validation(format!(
            "progress must be an integer between {MIN_PROGRESS} and {MAX_PROGRESS}, got {progress}"
        )));
    }
    // In range, so the narrowing cannot truncate.
    Ok(progress as i32)
}

/// Validate a discussion question breakpoint.
pub fn validate_breakpoint(breakpoint: i32) -> Result<(), CoreError> {
    if !(MIN_BREAKPOINT..=MAX_BREAKPOINT).contains(&breakpoint) {
        return Err(CoreError::Validation(format!(
            "breakpoint must be between {MIN_BREAKPOINT} and {MAX_BREAKPOINT}, got {breakpoint}"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Progress derivation
-------------------------------------------------------------------------- */

/// The value to persist when `submitted` arrives on top of `previous`.
///
/// Progress is monotonic: a smaller submission leaves the stored value
/// unchanged.
pub fn effective_progress(previous: Option<i32>, submitted: i32) -> i32 {
    previous.map_or(submitted, |prev| prev.max(submitted))
}

/// Whether a progress value counts as having finished the book.
pub fn is_finished(progress: i32) -> bool {
    progress >= MAX_PROGRESS
}

/// Whether a single breakpoint is open at `progress`.
pub fn is_unlocked(progress: i32, breakpoint: i32) -> bool {
    breakpoint <= progress
}

/// Ids of the discussions unlocked at `progress`, in the order given.
///
/// `discussions` is a list of `(discussion_id, breakpoint)` pairs.
pub fn unlocked_ids(progress: i32, discussions: &[(DbId, i32)]) -> Vec<DbId> {
    discussions
        .iter()
        .filter(|(_, breakpoint)| is_unlocked(progress, *breakpoint))
        .map(|(id, _)| *id)
        .collect()
}

/// Ids that are unlocked at `after` but were not unlocked at `before`.
///
/// A discussion that was already open before the write is never reported
/// again, whatever order the breakpoints are listed in.
pub fn newly_unlocked_ids(before: i32, after: i32, discussions: &[(DbId, i32)]) -> Vec<DbId> {
    discussions
        .iter()
        .filter(|(_, breakpoint)| {
            !is_unlocked(before, *breakpoint) && is_unlocked(after, *breakpoint)
        })
        .map(|(id, _)| *id)
        .collect()
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn discussions() -> Vec<(DbId, i32)> {
        vec![(1, 25), (2, 50), (3, 75), (4, 90)]
    }

    #[test]
    fn test_progress_bounds() {
        assert_eq!(validate_progress(0).unwrap(), 0);
        assert_eq!(validate_progress(100).unwrap(), 100);
        assert!(validate_progress(-1).is_err());
        assert!(validate_progress(101).is_err());
        assert!(validate_progress(i64::MAX).is_err());
    }

    #[test]
    fn test_breakpoint_bounds() {
        assert!(validate_breakpoint(1).is_ok());
        assert!(validate_breakpoint(100).is_ok());
        assert!(validate_breakpoint(0).is_err());
        assert!(validate_breakpoint(101).is_err());
    }

    #[test]
    fn test_effective_progress_never_regresses() {
        let mut stored = None;
        let mut seen = Vec::new();
        for submitted in [80, 30, 95] {
            let next = effective_progress(stored, submitted);
            stored = Some(next);
            seen.push(next);
        }
        assert_eq!(seen, vec![80, 80, 95]);
    }

    #[test]
    fn test_first_write_takes_submitted_value() {
        assert_eq!(effective_progress(None, 0), 0);
        assert_eq!(effective_progress(None, 42), 42);
    }

    #[test]
    fn test_finished_only_at_full_progress() {
        assert!(!is_finished(99));
        assert!(is_finished(100));
    }

    #[test]
    fn test_unlocked_sets_grow_with_progress() {
        let d = discussions();
        assert!(unlocked_ids(0, &d).is_empty());
        assert_eq!(unlocked_ids(30, &d), vec![1]);
        assert_eq!(unlocked_ids(60, &d), vec![1, 2]);
        assert_eq!(unlocked_ids(100, &d), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_breakpoint_equal_to_progress_is_unlocked() {
        assert_eq!(unlocked_ids(50, &discussions()), vec![1, 2]);
    }

    #[test]
    fn test_newly_unlocked_is_the_set_difference() {
        let d = discussions();
        assert_eq!(newly_unlocked_ids(30, 80, &d), vec![2, 3]);
        assert!(newly_unlocked_ids(80, 80, &d).is_empty());
    }

    #[test]
    fn test_newly_unlocked_ignores_list_order_and_duplicates() {
        let d = vec![(9, 50), (7, 10), (8, 50)];
        assert_eq!(newly_unlocked_ids(20, 60, &d), vec![9, 8]);
        assert!(newly_unlocked_ids(60, 60, &d).is_empty());
    }
}
