//! Request handlers.
//!
//! Each submodule provides the async handler functions for one area of the
//! API. Handlers validate input with `bookclub_core`, delegate persistence
//! to the repositories in `bookclub_db`, and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod badges;
pub mod books;
pub mod comments;
pub mod discussions;
pub mod polls;
pub mod progress;
pub mod reactions;
pub mod reviews;
pub mod users;
