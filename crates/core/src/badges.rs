//! Badge catalog and award rules.
//!
//! Every badge is earned by a single counter crossing a fixed threshold.
//! The rules live in [`BADGE_RULES`] and are evaluated uniformly; adding a
//! badge means adding a [`BadgeType`] variant, its catalog entry, and one
//! rule row. Discriminants must match the seed rows of the `badge_types`
//! table.

use std::collections::HashSet;

use serde::Serialize;

/* --------------------------------------------------------------------------
Badge types
-------------------------------------------------------------------------- */

/// Badge type id matching SMALLINT in the `badge_types` lookup table.
pub type BadgeTypeId = i16;

#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeType {
    FirstBook = 1,
    Bookworm = 2,
    AvidReader = 3,
    Bibliophile = 4,
    LibraryLegend = 5,
    FirstFinish = 6,
    Finisher5 = 7,
    Finisher10 = 8,
    FirstComment = 9,
    Conversationalist = 10,
    DiscussionLeader = 11,
    FirstReview = 12,
    Critic = 13,
    HelpfulHand = 14,
    DeepThinker = 15,
    Streak4 = 16,
    Streak12 = 17,
    Streak52 = 18,
}

/// Display metadata for a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub tier: i16,
}

impl BadgeType {
    pub const ALL: [BadgeType; 18] = [
        BadgeType::FirstBook,
        BadgeType::Bookworm,
        BadgeType::AvidReader,
        BadgeType::Bibliophile,
        BadgeType::LibraryLegend,
        BadgeType::FirstFinish,
        BadgeType::Finisher5,
        BadgeType::Finisher10,
        BadgeType::FirstComment,
        BadgeType::Conversationalist,
        BadgeType::DiscussionLeader,
        BadgeType::FirstReview,
        BadgeType::Critic,
        BadgeType::HelpfulHand,
        BadgeType::DeepThinker,
        BadgeType::Streak4,
        BadgeType::Streak12,
        BadgeType::Streak52,
    ];

    /// Return the database badge type id.
    pub fn id(self) -> BadgeTypeId {
        self as BadgeTypeId
    }

    pub fn from_id(id: BadgeTypeId) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.id() == id)
    }

    /// Stable machine code, also stored in `badge_types.code`.
    pub fn code(self) -> &'static str {
        match self {
            BadgeType::FirstBook => "FIRST_BOOK",
            BadgeType::Bookworm => "BOOKWORM",
            BadgeType::AvidReader => "AVID_READER",
            BadgeType::Bibliophile => "BIBLIOPHILE",
            BadgeType::LibraryLegend => "LIBRARY_LEGEND",
            BadgeType::FirstFinish => "FIRST_FINISH",
            BadgeType::Finisher5 => "FINISHER_5",
            BadgeType::Finisher10 => "FINISHER_10",
            BadgeType::FirstComment => "FIRST_COMMENT",
            BadgeType::Conversationalist => "CONVERSATIONALIST",
            BadgeType::DiscussionLeader => "DISCUSSION_LEADER",
            BadgeType::FirstReview => "FIRST_REVIEW",
            BadgeType::Critic => "CRITIC",
            BadgeType::HelpfulHand => "HELPFUL_HAND",
            BadgeType::DeepThinker => "DEEP_THINKER",
            BadgeType::Streak4 => "STREAK_4",
            BadgeType::Streak12 => "STREAK_12",
            BadgeType::Streak52 => "STREAK_52",
        }
    }

    pub fn info(self) -> BadgeInfo {
        let (name, description, icon, tier) = match self {
            BadgeType::FirstBook => ("First Book", "Started reading your first book", "📖", 1),
            BadgeType::Bookworm => ("Bookworm", "Started 5 books", "🐛", 2),
            BadgeType::AvidReader => ("Avid Reader", "Started 10 books", "📚", 3),
            BadgeType::Bibliophile => ("Bibliophile", "Started 25 books", "🏛️", 4),
            BadgeType::LibraryLegend => ("Library Legend", "Started 50 books", "👑", 5),
            BadgeType::FirstFinish => ("The End", "Finished your first book", "🏁", 1),
            BadgeType::Finisher5 => ("Page Turner", "Finished 5 books", "🔖", 2),
            BadgeType::Finisher10 => ("Completionist", "Finished 10 books", "🏆", 3),
            BadgeType::FirstComment => ("Ice Breaker", "Posted your first comment", "💬", 1),
            BadgeType::Conversationalist => ("Conversationalist", "Posted 25 comments", "🗣️", 2),
            BadgeType::DiscussionLeader => ("Discussion Leader", "Posted 100 comments", "🎤", 3),
            BadgeType::FirstReview => ("First Review", "Wrote your first review", "✍️", 1),
            BadgeType::Critic => ("Critic", "Wrote 10 reviews", "🎭", 2),
            BadgeType::HelpfulHand => ("Helpful Hand", "Received 10 helpful reactions", "🤝", 1),
            BadgeType::DeepThinker => ("Deep Thinker", "Received 10 insightful reactions", "💡", 1),
            BadgeType::Streak4 => ("Steady Reader", "Active 4 weeks in a row", "🔥", 1),
            BadgeType::Streak12 => ("Dedicated Reader", "Active 12 weeks in a row", "⚡", 2),
            BadgeType::Streak52 => ("Year of Reading", "Active 52 weeks in a row", "🌟", 3),
        };
        BadgeInfo {
            name,
            description,
            icon,
            tier,
        }
    }
}

impl Serialize for BadgeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/* --------------------------------------------------------------------------
Counters
-------------------------------------------------------------------------- */

/// Aggregate a badge rule is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeCounter {
    BooksStarted,
    BooksFinished,
    Reviews,
    Comments,
    HelpfulReceived,
    InsightfulReceived,
    CurrentStreak,
}

/// Current values of every [`BadgeCounter`] for one user, computed fresh
/// from the underlying rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BadgeCounters {
    pub books_started: i64,
    pub books_finished: i64,
    pub reviews: i64,
    pub comments: i64,
    pub helpful_received: i64,
    pub insightful_received: i64,
    pub current_streak: i64,
}

impl BadgeCounters {
    pub fn get(&self, counter: BadgeCounter) -> i64 {
        match counter {
            BadgeCounter::BooksStarted => self.books_started,
            BadgeCounter::BooksFinished => self.books_finished,
            BadgeCounter::Reviews => self.reviews,
            BadgeCounter::Comments => self.comments,
            BadgeCounter::HelpfulReceived => self.helpful_received,
            BadgeCounter::InsightfulReceived => self.insightful_received,
            BadgeCounter::CurrentStreak => self.current_streak,
        }
    }
}

/* --------------------------------------------------------------------------
Rules
-------------------------------------------------------------------------- */

/// `badge` is earned once `counter >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeRule {
    pub badge: BadgeType,
    pub counter: BadgeCounter,
    pub threshold: i64,
}

const fn rule(badge: BadgeType, counter: BadgeCounter, threshold: i64) -> BadgeRule {
    BadgeRule {
        badge,
        counter,
        threshold,
    }
}

pub static BADGE_RULES: &[BadgeRule] = &[
    rule(BadgeType::FirstBook, BadgeCounter::BooksStarted, 1),
    rule(BadgeType::Bookworm, BadgeCounter::BooksStarted, 5),
    rule(BadgeType::AvidReader, BadgeCounter::BooksStarted, 10),
    rule(BadgeType::Bibliophile, BadgeCounter::BooksStarted, 25),
    rule(BadgeType::LibraryLegend, BadgeCounter::BooksStarted, 50),
    rule(BadgeType::FirstFinish, BadgeCounter::BooksFinished, 1),
    rule(BadgeType::Finisher5, BadgeCounter::BooksFinished, 5),
    rule(BadgeType::Finisher10, BadgeCounter::BooksFinished, 10),
    rule(BadgeType::FirstComment, BadgeCounter::Comments, 1),
    rule(BadgeType::Conversationalist, BadgeCounter::Comments, 25),
    rule(BadgeType::DiscussionLeader, BadgeCounter::Comments, 100),
    rule(BadgeType::FirstReview, BadgeCounter::Reviews, 1),
    rule(BadgeType::Critic, BadgeCounter::Reviews, 10),
    rule(BadgeType::HelpfulHand, BadgeCounter::HelpfulReceived, 10),
    rule(BadgeType::DeepThinker, BadgeCounter::InsightfulReceived, 10),
    rule(BadgeType::Streak4, BadgeCounter::CurrentStreak, 4),
    rule(BadgeType::Streak12, BadgeCounter::CurrentStreak, 12),
    rule(BadgeType::Streak52, BadgeCounter::CurrentStreak, 52),
];

/// Badges whose threshold is met by `counters` and that are not in
/// `awarded`, in rule-table order.
pub fn newly_earned(counters: &BadgeCounters, awarded: &HashSet<BadgeType>) -> Vec<BadgeType> {
    BADGE_RULES
        .iter()
        .filter(|r| !awarded.contains(&r.badge))
        .filter(|r| counters.get(r.counter) >= r.threshold)
        .map(|r| r.badge)
        .collect()
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_badge_has_exactly_one_rule() {
        for badge in BadgeType::ALL {
            let n = BADGE_RULES.iter().filter(|r| r.badge == badge).count();
            assert_eq!(n, 1, "{badge:?} should have exactly one rule");
        }
        assert_eq!(BADGE_RULES.len(), BadgeType::ALL.len());
    }

    #[test]
    fn test_tier_is_position_along_counter_line() {
        let mut seen: Vec<(BadgeCounter, i16)> = Vec::new();
        for r in BADGE_RULES {
            let position = seen.iter().filter(|(c, _)| *c == r.counter).count() as i16 + 1;
            assert_eq!(r.badge.info().tier, position, "{:?}", r.badge);
            seen.push((r.counter, position));
        }
        assert_eq!(BadgeType::LibraryLegend.info().tier, 5);
        assert_eq!(BadgeType::HelpfulHand.info().tier, 1);
    }

    #[test]
    fn test_ids_round_trip_and_are_dense() {
        for (i, badge) in BadgeType::ALL.into_iter().enumerate() {
            assert_eq!(badge.id(), i as i16 + 1);
            assert_eq!(BadgeType::from_id(badge.id()), Some(badge));
        }
        assert_eq!(BadgeType::from_id(0), None);
        assert_eq!(BadgeType::from_id(99), None);
    }

    #[test]
    fn test_no_counters_no_badges() {
        assert!(newly_earned(&BadgeCounters::default(), &HashSet::new()).is_empty());
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let counters = BadgeCounters {
            books_started: 5,
            ..Default::default()
        };
        let earned = newly_earned(&counters, &HashSet::new());
        assert_eq!(earned, vec![BadgeType::FirstBook, BadgeType::Bookworm]);
    }

    #[test]
    fn test_already_awarded_badges_are_skipped() {
        let counters = BadgeCounters {
            comments: 30,
            reviews: 1,
            ..Default::default()
        };
        let awarded = HashSet::from([BadgeType::FirstComment]);
        let earned = newly_earned(&counters, &awarded);
        assert_eq!(
            earned,
            vec![BadgeType::Conversationalist, BadgeType::FirstReview]
        );
    }

    #[test]
    fn test_second_evaluation_is_empty() {
        let counters = BadgeCounters {
            books_started: 12,
            books_finished: 1,
            current_streak: 4,
            helpful_received: 10,
            insightful_received: 9,
            ..Default::default()
        };
        let first = newly_earned(&counters, &HashSet::new());
        assert!(first.contains(&BadgeType::Streak4));
        assert!(first.contains(&BadgeType::HelpfulHand));
        assert!(!first.contains(&BadgeType::DeepThinker));

        let awarded: HashSet<_> = first.into_iter().collect();
        assert!(newly_earned(&counters, &awarded).is_empty());
    }

    #[test]
    fn test_badge_type_serializes_as_code() {
        assert_eq!(serde_json::to_value(BadgeType::Streak52).unwrap(), "STREAK_52");
        assert_eq!(serde_json::to_value(BadgeType::FirstBook).unwrap(), "FIRST_BOOK");
        for badge in BadgeType::ALL {
            assert_eq!(serde_json::to_value(badge).unwrap(), badge.code());
        }
    }
}
