//! Reaction types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kinds of reaction a member can leave on a comment or review.
///
/// Stored as the upper-case name in `reactions.reaction_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionType {
    Like,
    Love,
    Helpful,
    Insightful,
    Funny,
}

impl ReactionType {
    pub const ALL: [ReactionType; 5] = [
        ReactionType::Like,
        ReactionType::Love,
        ReactionType::Helpful,
        ReactionType::Insightful,
        ReactionType::Funny,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReactionType::Like => "LIKE",
            ReactionType::Love => "LOVE",
            ReactionType::Helpful => "HELPFUL",
            ReactionType::Insightful => "INSIGHTFUL",
            ReactionType::Funny => "FUNNY",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let valid: Vec<_> = Self::ALL.iter().map(|r| r.as_str()).collect();
                CoreError::Validation(format!(
                    "Invalid reaction type '{s}'. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Members cannot react to their own comments or reviews.
pub fn validate_not_self_reaction(
    reactor_id: crate::types::DbId,
    author_id: crate::types::DbId,
) -> Result<(), CoreError> {
    if reactor_id == author_id {
        return Err(CoreError::Validation(
            "You cannot react to your own content".to_string(),
        ));
    }
    Ok(())
}
