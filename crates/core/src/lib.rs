//! Domain rules for the book club platform.
//!
//! Everything in this crate is pure: no database access, no HTTP. The
//! persistence and API crates call into these functions to validate input
//! and to derive state (unlocked discussions, poll rankings, streaks,
//! badge awards) from rows they have already loaded.

pub mod badges;
pub mod book;
pub mod discussion;
pub mod error;
pub mod poll;
pub mod progress;
pub mod reaction;
pub mod review;
pub mod roles;
pub mod streak;
pub mod types;
