//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Outcome enums for transactional operations that check domain
//!   preconditions under lock

pub mod badge;
pub mod book;
pub mod comment;
pub mod discussion;
pub mod poll;
pub mod progress;
pub mod reaction;
pub mod review;
pub mod status;
pub mod user;
