//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod badge_repo;
pub mod book_repo;
pub mod comment_repo;
pub mod discussion_repo;
pub mod poll_repo;
pub mod progress_repo;
pub mod reaction_repo;
pub mod review_repo;
pub mod user_repo;

pub use badge_repo::BadgeRepo;
pub use book_repo::BookRepo;
pub use comment_repo::CommentRepo;
pub use discussion_repo::DiscussionRepo;
pub use poll_repo::PollRepo;
pub use progress_repo::ProgressRepo;
pub use reaction_repo::ReactionRepo;
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;
